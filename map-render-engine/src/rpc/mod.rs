//! JSON-RPC 2.0 communication layer for the hosting page.
//!
//! The map runs inside an iframe; the page's settings panel, hover tooltip and
//! detail panel live outside it and talk to the engine via `postMessage`.
//!
//! ## Message Flow
//!
//! ```text
//! Page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ set_view_settings (with ID) ────────> │
//!        │                                        ├─ ViewRequest event
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <──── hover_changed / camera_moved ────┤  MapEvent forwarding
//! ```
//!
//! Requests without an `id` are applied but never answered. View arguments
//! are `"left"` or `"right"`; anything else is rejected with `-32602` before
//! it reaches the scene.
//!
//! ## Partial Settings
//!
//! `set_view_settings` and `set_scene_tweaks` accept any subset of fields.
//! The given fields are merged onto the latest accepted settings of the view,
//! including requests earlier in the same frame, so
//!
//! ```json
//! {"jsonrpc": "2.0", "method": "set_view_settings", "id": 7,
//!  "params": {"view": "right", "settings": {"wireframe": true, "tweaks": {"fog_density": 2.0}}}}
//! ```
//!
//! only flips the wireframe and the fog density of the right view.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (unknown view, unsupported resolution, remote map)
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### View Configuration
//! - `set_view_settings`: Merge a partial settings record into one view
//! - `set_scene_tweaks`: Merge partial material, light and fog values
//! - `set_split_view`: Show or remove the right-hand view
//! - `clear_selection`: Drop the selected area (detail panel closed)
//!
//! ### Queries
//! - `get_camera_state`: Camera position of a live view
//! - `get_areas`: Areas of interest as loaded from the dataset
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! - `engine_ready`: Views spawned after the dataset resolved
//! - `camera_moved`: Camera position after a pan or zoom
//! - `hover_changed`: Hovered area id, or null
//! - `area_selected`: Selected area id, or null when cleared
//! - `map_texture_status`: Map image loaded or failed
//! - `fps_update`: Smoothed frame rate every 0.5 s

/// JSON-RPC 2.0 bidirectional communication system for the hosting page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;

/// Map methods: partial settings merges, view queries and event payloads.
pub mod handlers;
