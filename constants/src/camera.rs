/// Camera altitude limits.
pub const CAM_Y_MIN: f32 = 0.06;
pub const CAM_Y_MAX: f32 = 0.35;
pub const CAM_Y_DEFAULT: f32 = 0.18;

/// Initial camera position, slightly south of the map centre.
pub const CAM_START_X: f32 = 0.0;
pub const CAM_START_Z: f32 = 0.08;

/// The camera always looks at `(x, 0, z - LOOK_AHEAD_Z)`.
pub const LOOK_AHEAD_Z: f32 = 0.06;

/// Pan is clamped to this fraction of the terrain extents.
pub const PAN_MARGIN: f32 = 0.45;

/// World units panned per viewport-width of drag, per unit of altitude.
pub const PAN_SPEED_PER_ALTITUDE: f32 = 0.7;

/// Altitude change per wheel event.
pub const ZOOM_STEP: f32 = 0.008;

/// Pointer travel in pixels (per move event, either axis) that turns a click into a drag.
pub const DRAG_THRESHOLD_PX: f32 = 2.0;

pub const FOV_Y_DEGREES: f32 = 50.0;
pub const NEAR: f32 = 0.001;
pub const FAR: f32 = 10.0;
