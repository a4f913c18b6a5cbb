//! Shared numeric constants for the terrain map engine.
//!
//! Everything here is plain data: terrain extents and feature tables, camera
//! limits, agent population tuning and the render palette.

pub mod agents;
pub mod camera;
pub mod markers;
pub mod render_settings;
pub mod terrain;
