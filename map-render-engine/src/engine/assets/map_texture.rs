use bevy::asset::LoadState;
use bevy::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureStatus {
    Loading,
    Loaded,
    Failed,
}

/// Map images come from the local asset folder; there is no remote source.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapPathError {
    #[error("map path is empty")]
    Empty,
    #[error("remote map '{0}' is not supported, use a path under assets/")]
    Remote(String),
}

pub fn validate_map_path(path: &str) -> Result<(), MapPathError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(MapPathError::Empty);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("://") || lower.starts_with("//") {
        return Err(MapPathError::Remote(trimmed.to_string()));
    }
    Ok(())
}

/// Map image for one view's terrain.
///
/// Loading is fire-and-forget: the terrain renders with its base colour until
/// the image resolves, and a failed load simply leaves it untextured.
#[derive(Debug, Clone, Default)]
pub struct MapTextureSlot {
    pub path: String,
    pending: Option<Handle<Image>>,
    loaded: Option<Handle<Image>>,
    reported: Option<TextureStatus>,
    rejected: bool,
}

impl MapTextureSlot {
    /// Begin loading `path`. The currently displayed image stays until the new
    /// one resolves.
    ///
    /// A path the asset server cannot serve is not loaded; the next poll
    /// reports it as failed.
    pub fn request(&mut self, path: &str, asset_server: &AssetServer) {
        self.path = path.to_string();
        self.reported = None;
        if let Err(err) = validate_map_path(path) {
            warn!("Map texture rejected: {}", err);
            self.pending = None;
            self.rejected = true;
            return;
        }
        info!("Loading map texture: {}", path);
        self.rejected = false;
        self.pending = Some(asset_server.load(path.to_string()));
    }

    /// Image to bind on the terrain material, if one has finished loading.
    pub fn texture(&self) -> Option<Handle<Image>> {
        self.loaded.clone()
    }

    /// Check the pending load. Returns the new status the first time it changes.
    ///
    /// On success the previous image handle is dropped, releasing it once no
    /// other view holds it.
    pub fn poll(&mut self, asset_server: &AssetServer) -> Option<TextureStatus> {
        if self.rejected {
            self.rejected = false;
            self.reported = Some(TextureStatus::Failed);
            return Some(TextureStatus::Failed);
        }
        let handle = self.pending.as_ref()?;
        let status = match asset_server.get_load_state(handle) {
            Some(LoadState::Loaded) => TextureStatus::Loaded,
            Some(LoadState::Failed(err)) => {
                warn!("Map texture '{}' failed to load: {}", self.path, err);
                TextureStatus::Failed
            }
            _ => TextureStatus::Loading,
        };

        match status {
            TextureStatus::Loaded => {
                self.loaded = self.pending.take();
            }
            TextureStatus::Failed => {
                self.pending = None;
            }
            TextureStatus::Loading => {}
        }

        if self.reported == Some(status) {
            return None;
        }
        self.reported = Some(status);
        Some(status)
    }

    /// Drop every handle this slot holds.
    pub fn release(&mut self) {
        self.pending = None;
        self.loaded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_and_empty_paths_are_refused() {
        assert_eq!(validate_map_path("textures/map.jpg"), Ok(()));
        assert_eq!(validate_map_path("  "), Err(MapPathError::Empty));
        assert_eq!(
            validate_map_path("https://tiles.example.org/map.jpg"),
            Err(MapPathError::Remote("https://tiles.example.org/map.jpg".into()))
        );
        assert!(matches!(validate_map_path("HTTP://host/map.png"), Err(MapPathError::Remote(_))));
        assert!(matches!(validate_map_path("//cdn/map.png"), Err(MapPathError::Remote(_))));
    }

    fn asset_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Image>();
        app
    }

    #[test]
    fn rejected_request_reports_failure_once() {
        let app = asset_app();
        let asset_server = app.world().resource::<AssetServer>();
        let mut slot = MapTextureSlot::default();

        slot.request("https://tiles.example.org/map.jpg", asset_server);

        assert_eq!(slot.poll(asset_server), Some(TextureStatus::Failed));
        assert_eq!(slot.poll(asset_server), None);
        assert!(slot.texture().is_none());
        assert_eq!(slot.path, "https://tiles.example.org/map.jpg");
    }
}
