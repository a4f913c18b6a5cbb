use bevy::prelude::*;
use constants::render_settings::DEFAULT_MAP;
use constants::terrain::{DEFAULT_SEGMENTS, SEGMENT_OPTIONS, SPLIT_RIGHT_SEGMENTS};
use serde::{Deserialize, Serialize};

use super::markers::MarkerStyle;

/// One of the two map views. Single-view mode only uses `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    Left,
    Right,
}

impl ViewId {
    pub fn other(self) -> Self {
        match self {
            ViewId::Left => ViewId::Right,
            ViewId::Right => ViewId::Left,
        }
    }

    /// Render layer isolating this view's entities from its peer.
    pub fn render_layer(self) -> usize {
        match self {
            ViewId::Left => 1,
            ViewId::Right => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Left => "left",
            ViewId::Right => "right",
        }
    }
}

/// Continuous material, light and fog parameters.
///
/// Values outside [`SceneTweaks::RANGES`] are applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTweaks {
    pub terrain_roughness: f32,
    pub terrain_metalness: f32,
    pub ocean_roughness: f32,
    pub ocean_metalness: f32,
    pub sun_intensity: f32,
    pub ambient_intensity: f32,
    pub fog_density: f32,
}

impl Default for SceneTweaks {
    fn default() -> Self {
        Self {
            terrain_roughness: 0.82,
            terrain_metalness: 0.0,
            ocean_roughness: 0.95,
            ocean_metalness: 0.0,
            sun_intensity: 1.0,
            ambient_intensity: 0.7,
            fog_density: 1.2,
        }
    }
}

impl SceneTweaks {
    /// Slider ranges offered by the settings panel.
    pub const RANGES: [(&'static str, f32, f32); 7] = [
        ("terrain_roughness", 0.0, 1.0),
        ("terrain_metalness", 0.0, 1.0),
        ("ocean_roughness", 0.0, 1.0),
        ("ocean_metalness", 0.0, 1.0),
        ("sun_intensity", 0.0, 3.0),
        ("ambient_intensity", 0.0, 2.0),
        ("fog_density", 0.0, 5.0),
    ];
}

/// Everything the page can configure about one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub map: String,
    pub segments: u32,
    pub marker_style: MarkerStyle,
    pub wireframe: bool,
    pub show_texture: bool,
    pub show_markers: bool,
    pub show_overlay: bool,
    pub show_clouds: bool,
    pub show_birds: bool,
    pub tweaks: SceneTweaks,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            map: DEFAULT_MAP.to_string(),
            segments: DEFAULT_SEGMENTS,
            marker_style: MarkerStyle::Rune,
            wireframe: false,
            show_texture: true,
            show_markers: true,
            show_overlay: true,
            show_clouds: true,
            show_birds: true,
            tweaks: SceneTweaks::default(),
        }
    }
}

impl ViewSettings {
    /// Defaults for a view: the right split view renders at a finer resolution.
    pub fn for_view(view: ViewId) -> Self {
        match view {
            ViewId::Left => Self::default(),
            ViewId::Right => Self {
                segments: SPLIT_RIGHT_SEGMENTS,
                ..Self::default()
            },
        }
    }

    pub fn segments_supported(segments: u32) -> bool {
        SEGMENT_OPTIONS.contains(&segments)
    }

    /// Classify what has to happen to move a live view from `self` to `next`.
    pub fn diff(&self, next: &ViewSettings) -> SettingsChange {
        SettingsChange {
            rebuild: self.segments != next.segments || self.marker_style != next.marker_style,
            map: self.map != next.map,
            material: self.wireframe != next.wireframe || self.show_texture != next.show_texture,
            visibility: self.show_markers != next.show_markers
                || self.show_overlay != next.show_overlay
                || self.show_clouds != next.show_clouds
                || self.show_birds != next.show_birds,
            tweaks: self.tweaks != next.tweaks,
        }
    }
}

/// Update paths triggered by a settings change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    /// Geometry identity changed; the view is torn down and rebuilt.
    pub rebuild: bool,
    /// Map image path changed; swap the texture in place.
    pub map: bool,
    /// Wireframe or texture toggle changed on the terrain material.
    pub material: bool,
    /// Marker, overlay, cloud or bird visibility changed.
    pub visibility: bool,
    /// Material, light or fog parameters changed.
    pub tweaks: bool,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Single or split-screen layout of the map views.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewLayout {
    pub split: bool,
}

impl ViewLayout {
    pub fn views(&self) -> &'static [ViewId] {
        if self.split {
            &[ViewId::Left, ViewId::Right]
        } else {
            &[ViewId::Left]
        }
    }

    /// Pixel rect of a view inside a window of the given logical size.
    pub fn viewport_rect(&self, view: ViewId, window: Vec2) -> Rect {
        if !self.split {
            return Rect::from_corners(Vec2::ZERO, window);
        }
        let half = (window.x * 0.5).floor();
        match view {
            ViewId::Left => Rect::new(0.0, 0.0, half, window.y),
            ViewId::Right => Rect::new(half, 0.0, window.x, window.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_change_requires_rebuild() {
        let current = ViewSettings::default();
        let next = ViewSettings {
            segments: 128,
            ..current.clone()
        };
        let change = current.diff(&next);
        assert!(change.rebuild);
        assert!(!change.tweaks);
    }

    #[test]
    fn tweak_change_is_applied_in_place() {
        let current = ViewSettings::default();
        let mut next = current.clone();
        next.tweaks.sun_intensity = 2.5;
        let change = current.diff(&next);
        assert!(!change.rebuild);
        assert!(change.tweaks);
        assert!(!change.visibility);
    }

    #[test]
    fn toggles_and_map_do_not_rebuild() {
        let current = ViewSettings::default();
        let next = ViewSettings {
            map: "textures/map2.jpg".into(),
            show_markers: false,
            wireframe: true,
            ..current.clone()
        };
        let change = current.diff(&next);
        assert!(!change.rebuild);
        assert!(change.map && change.visibility && change.material);
    }

    #[test]
    fn identical_settings_change_nothing() {
        let s = ViewSettings::for_view(ViewId::Right);
        assert!(s.diff(&s.clone()).is_empty());
        assert_eq!(s.segments, 512);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: ViewSettings =
            serde_json::from_str(r#"{"segments":128,"tweaks":{"fog_density":3.0}}"#).unwrap();
        assert_eq!(parsed.segments, 128);
        assert_eq!(parsed.tweaks.fog_density, 3.0);
        assert_eq!(parsed.tweaks.sun_intensity, 1.0);
        assert!(parsed.show_markers);
    }

    #[test]
    fn split_layout_halves_the_window() {
        let layout = ViewLayout { split: true };
        let window = Vec2::new(1001.0, 600.0);
        let left = layout.viewport_rect(ViewId::Left, window);
        let right = layout.viewport_rect(ViewId::Right, window);
        assert_eq!(left.max.x, right.min.x);
        assert_eq!(right.max.x, 1001.0);
        assert_eq!(ViewLayout::default().views(), &[ViewId::Left]);
    }
}
