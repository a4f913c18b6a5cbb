//! Per-frame animation of the map views.
//!
//! [`frame::frame_update`] advances the simulation state held in each
//! [`SceneHandle`](crate::engine::scene::SceneHandle); the systems in
//! [`sync`] copy that state onto the spawned entities afterwards.

/// Pure per-view frame step: agents, rune spin, hover and opacity easing.
pub mod frame;

/// Systems driving the frame step and mirroring it onto transforms, materials and labels.
pub mod sync;

pub use frame::{FrameOutcome, frame_update};
