//! Map views: configuration, scene construction and lifecycle.
//!
//! A view is one [`SceneHandle`] component holding the simulation state plus
//! the entities and GPU assets spawned for it. Views are built from their
//! [`ViewSettings`], updated in place for cheap changes, and torn down and
//! rebuilt when the terrain resolution or marker style changes.
//!
//! ## Update paths
//!
//! ```text
//! ViewRequest::Settings / Tweaks
//!   └─> ViewSettings::diff()
//!       ├─> rebuild      teardown_view() + build_view()
//!       ├─> map          MapTextureSlot::request(), bound on load
//!       ├─> material     wireframe / texture binding
//!       ├─> visibility   markers, overlay, clouds, birds
//!       └─> tweaks       materials, lights, fog
//! ```

/// Per-view settings, scene tweaks, settings diffing and split layout.
pub mod settings;

/// Marker styles, glyph recipes and per-marker animated state.
pub mod markers;

/// The per-view scene handle and the entities it owns.
pub mod handle;

/// Entity and asset construction and teardown of a view.
pub mod builder;

/// Outbound view events and inbound view requests.
pub mod events;

/// Request handling, map texture polling and viewport layout.
pub mod lifecycle;

pub use events::{MapEvent, ViewRequest};
pub use handle::SceneHandle;
pub use lifecycle::ViewConfigs;
pub use settings::{SceneTweaks, ViewId, ViewLayout, ViewSettings};
