//! Runtime diagnostics systems.

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to the page via RPC and updates the native overlay.
pub mod fps_tracking;
