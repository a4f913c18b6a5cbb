/// Markers float this far above the terrain surface.
pub const MARKER_LIFT: f32 = 0.01;
pub const HIT_RADIUS: f32 = 0.004;
pub const GLOW_RADIUS: f32 = 0.004;
pub const STEM_RADIUS: f32 = 0.00015;
pub const STEM_OPACITY: f32 = 0.3;

/// Labels sit this far above the marker.
pub const LABEL_LIFT: f32 = 0.007;
pub const LABEL_FONT_SIZE: f32 = 14.0;

/// Rune glyph radius and bar thickness.
pub const RUNE_RADIUS: f32 = 0.002;
pub const RUNE_THICKNESS: f32 = 0.0003;
pub const RUNE_SPIN_RATE: f32 = 0.4;

/// Per-frame exponential blend factors and their targets.
pub const LABEL_IDLE_TARGET: f32 = 0.0;
pub const LABEL_IDLE_RATE: f32 = 0.12;
pub const LABEL_HOVER_TARGET: f32 = 1.0;
pub const LABEL_HOVER_RATE: f32 = 0.25;
pub const GLOW_IDLE_TARGET: f32 = 0.3;
pub const GLOW_IDLE_RATE: f32 = 0.1;
pub const GLOW_HOVER_TARGET: f32 = 0.7;
pub const GLOW_HOVER_RATE: f32 = 0.15;
pub const GLOW_INITIAL: f32 = 0.1;
