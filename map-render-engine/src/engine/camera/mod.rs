//! Map camera model for terrain navigation.
//!
//! Drag-to-pan and wheel-to-zoom over the terrain with clamped altitude and
//! pan margins, plus pick rays for marker hit testing.

/// Camera state, pan/zoom rules and pick ray construction.
pub mod map_camera;

pub use map_camera::{CameraState, MapCamera, cursor_to_ndc};
