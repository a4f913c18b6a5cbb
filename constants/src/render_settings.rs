use bevy::color::Color;

pub const BACKGROUND: Color = Color::srgb(0.039, 0.165, 0.290);
pub const OCEAN: Color = Color::srgb(0.075, 0.290, 0.431);
pub const TERRAIN_BASE: Color = Color::WHITE;
pub const STEM: Color = Color::srgb(1.0, 0.984, 0.906);
pub const LABEL: Color = Color::srgb(1.0, 0.984, 0.906);

pub const SUN: Color = Color::srgb(1.0, 0.973, 0.910);
pub const SUN_POSITION: [f32; 3] = [0.3, 0.4, -0.2];
pub const FILL: Color = Color::srgb(0.541, 0.706, 0.973);
pub const FILL_POSITION: [f32; 3] = [-0.2, 0.3, 0.3];
pub const FILL_INTENSITY: f32 = 0.25;

/// Scale from the page's unit light intensities to bevy's.
pub const DIRECTIONAL_LUX_PER_UNIT: f32 = 4000.0;
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 800.0;

/// Darkening bands over the top and bottom of each view.
pub const OVERLAY_TOP_ALPHA: f32 = 0.2;
pub const OVERLAY_BOTTOM_ALPHA: f32 = 0.3;
pub const OVERLAY_BAND_PERCENT: f32 = 35.0;

pub const BIRD: Color = Color::srgb(0.102, 0.102, 0.165);
pub const BIRD_WING_OPACITY: f32 = 0.6;

pub const LABEL_WIDTH_PX: f32 = 200.0;

pub const DEFAULT_MAP: &str = "textures/map.jpg";
pub const AREAS_PATH: &str = "data/areas.json";
