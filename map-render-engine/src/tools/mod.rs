//! Pointer interaction for the map views.
//!
//! Turns window input into camera pans, wheel zoom, marker hover and click
//! selection, and keeps the two split views looking at the same place.
//!
//! ## Pointer Flow
//!
//! ```text
//! CursorMoved / MouseButton / MouseWheel
//!   └─> pointer_input_system()
//!       ├─> route to the view whose viewport contains the cursor
//!       ├─> pan / zoom ──> MapEvent::CameraMoved
//!       │                    └─> mirror_camera_system() ──> other view
//!       └─> click without drag ──> pick_marker() ──> MapEvent::AreaSelected
//! ```
//!
//! Hover is not driven from here: the frame update re-picks every frame from
//! the stored pointer NDC so markers passing under a still cursor highlight.
//!
//! ## Drag vs Click
//!
//! A press starts a drag. Any single move larger than 2 px marks the drag as
//! moved, and a release after a moved drag never selects. A release over
//! empty terrain keeps the previous selection.

/// Drag, wheel and click handling per view.
pub mod interaction;

/// Analytic ray/sphere picking against marker hit targets.
pub mod picking;

/// Split view camera mirroring.
pub mod camera_sync;
