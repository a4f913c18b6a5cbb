pub const BIRD_COUNT: usize = 14;
pub const CUMULUS_COUNT: usize = 30;
pub const NIMBOSTRATUS_COUNT: usize = 5;

/// Cumulus clouds with an index below this start scattered over the map.
pub const CUMULUS_ON_MAP: usize = 15;
pub const NIMBOSTRATUS_ON_MAP: usize = 3;

/// Birds respawn once they leave this radius around the origin.
pub const BIRD_RECYCLE_RADIUS: f32 = 0.22;
pub const BIRD_SPAWN_RADIUS_MIN: f32 = 0.1;
pub const BIRD_SPAWN_RADIUS_SPAN: f32 = 0.08;
pub const BIRD_ALTITUDE_MIN: f32 = 0.04;
pub const BIRD_ALTITUDE_SPAN: f32 = 0.04;
pub const BIRD_SPEED_MIN: f32 = 0.006;
pub const BIRD_SPEED_SPAN: f32 = 0.01;
/// Birds head for a point within this square around the origin.
pub const BIRD_TARGET_SPAN: f32 = 0.12;
pub const BIRD_TARGET_ALTITUDE_MIN: f32 = 0.04;
pub const BIRD_TARGET_ALTITUDE_SPAN: f32 = 0.03;
pub const BIRD_SCALE_MIN: f32 = 0.2;
pub const BIRD_SCALE_SPAN: f32 = 0.3;

pub const BIRD_FLAP_RATE: f32 = 5.0;
pub const BIRD_FLAP_PHASE: f32 = 1.7;
pub const BIRD_FLAP_AMPLITUDE: f32 = 0.45;
pub const BIRD_SWAY_RATE: f32 = 0.7;
pub const BIRD_SWAY_AMPLITUDE: f32 = 0.08;

/// Clouds respawn once `x` passes this fraction of the terrain width.
pub const CLOUD_RECYCLE_X_FACTOR: f32 = 0.7;

/// Cloud shadows float this far above the terrain surface.
pub const CLOUD_SHADOW_LIFT: f32 = 0.004;
pub const CLOUD_SHADOW_SCALE: f32 = 1.2;
pub const CLOUD_SHADOW_MAX_ALPHA: f32 = 0.7;
pub const CLOUD_OPACITY_FACTOR: f32 = 0.5;

/// Resolution of the procedural cloud sprite rasters.
pub const CLOUD_RASTER_SIZE: usize = 128;
/// Distinct sprite variants generated per view.
pub const CLOUD_RASTER_VARIANTS: usize = 6;
