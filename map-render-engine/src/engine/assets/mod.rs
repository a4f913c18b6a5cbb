//! Asset data consumed by the map scenes.
//!
//! The points-of-interest dataset is loaded as a JSON asset; map images are
//! requested per view and polled until they resolve.

/// Area records, categories and the loadable catalog asset.
pub mod areas;

/// Best-effort asynchronous map image loading per view.
pub mod map_texture;

pub use areas::{Area, AreaCatalog, Category, DatasetError};
pub use map_texture::{MapPathError, MapTextureSlot, TextureStatus, validate_map_path};
