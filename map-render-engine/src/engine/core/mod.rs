//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, dataset loading and
//! plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with asset loading, the RPC bridge, and the ordered
/// per-frame chain of view systems.
pub mod app_setup;

/// Application state machine and dataset loading.
///
/// Waits for the areas dataset, then spawns the views and enters Running.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
