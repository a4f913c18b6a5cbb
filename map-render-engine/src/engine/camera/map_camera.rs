use bevy::prelude::*;
use constants::camera::{
    CAM_START_X, CAM_START_Z, CAM_Y_DEFAULT, CAM_Y_MAX, CAM_Y_MIN, FOV_Y_DEGREES, LOOK_AHEAD_Z,
    PAN_MARGIN, PAN_SPEED_PER_ALTITUDE, ZOOM_STEP,
};
use constants::terrain::{TERRAIN_H, TERRAIN_W};
use serde::{Deserialize, Serialize};

/// Camera position in terrain-local world units. Orientation is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: CAM_START_X,
            y: CAM_Y_DEFAULT,
            z: CAM_START_Z,
        }
    }
}

impl CameraState {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Top-down map camera: drag pans across the terrain, wheel changes altitude.
///
/// The camera always looks at a point slightly ahead of itself on the sea
/// plane, giving the tilted bird's-eye view of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCamera {
    state: CameraState,
    pan_limit: Vec2,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new(Vec2::new(TERRAIN_W as f32 * 0.5, TERRAIN_H as f32 * 0.5))
    }
}

impl MapCamera {
    pub fn new(terrain_half_extents: Vec2) -> Self {
        Self {
            state: CameraState::default(),
            pan_limit: terrain_half_extents * 2.0 * PAN_MARGIN,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Largest `|x|` and `|z|` the camera may pan to.
    pub fn pan_limit(&self) -> Vec2 {
        self.pan_limit
    }

    /// Pan by a pointer delta in pixels. Higher altitude pans further per pixel.
    ///
    /// Returns false without moving when the viewport has no area.
    pub fn pan(&mut self, delta: Vec2, viewport: Vec2) -> bool {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return false;
        }
        let speed = self.state.y * PAN_SPEED_PER_ALTITUDE;
        self.state.x -= delta.x / viewport.x * speed;
        self.state.z -= delta.y / viewport.y * speed;
        self.clamp_pan();
        true
    }

    /// Step altitude by one wheel notch. Positive `delta_y` (scroll towards the
    /// user) zooms out. A zero delta is ignored.
    pub fn zoom(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let step = if delta_y > 0.0 { ZOOM_STEP } else { -ZOOM_STEP };
        self.state.y = (self.state.y + step).clamp(CAM_Y_MIN, CAM_Y_MAX);
        true
    }

    /// Overwrite the camera wholesale with a state mirrored from a peer view.
    pub fn apply_state(&mut self, state: CameraState) {
        self.state = state;
    }

    fn clamp_pan(&mut self) {
        self.state.x = self.state.x.clamp(-self.pan_limit.x, self.pan_limit.x);
        self.state.z = self.state.z.clamp(-self.pan_limit.y, self.pan_limit.y);
    }

    pub fn look_target(&self) -> Vec3 {
        Vec3::new(self.state.x, 0.0, self.state.z - LOOK_AHEAD_Z)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.state.position()).looking_at(self.look_target(), Vec3::Y)
    }

    /// World-space pick ray through normalised device coordinates
    /// (`-1..1`, y up) for a viewport of the given aspect ratio.
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Option<Ray3d> {
        if !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }
        let half_h = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        let local = Vec3::new(ndc.x * half_h * aspect, ndc.y * half_h, -1.0);
        let direction = Dir3::new(self.transform().rotation * local).ok()?;
        Some(Ray3d::new(self.state.position(), direction))
    }

    /// Project a world point to pixels inside a viewport of `size` (y down).
    /// None when the point is behind the camera.
    pub fn world_to_viewport(&self, world: Vec3, size: Vec2) -> Option<Vec2> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let transform = self.transform();
        let local = transform.rotation.inverse() * (world - transform.translation);
        if local.z >= 0.0 {
            return None;
        }
        let half_h = (FOV_Y_DEGREES.to_radians() * 0.5).tan();
        let aspect = size.x / size.y;
        let ndc = Vec2::new(
            local.x / -local.z / (half_h * aspect),
            local.y / -local.z / half_h,
        );
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y))
    }
}

/// Convert a cursor position inside a viewport rect (pixels, y down) to NDC (y up).
pub fn cursor_to_ndc(cursor: Vec2, viewport: Rect) -> Option<Vec2> {
    let size = viewport.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let local = cursor - viewport.min;
    Some(Vec2::new(
        local.x / size.x * 2.0 - 1.0,
        -(local.y / size.y * 2.0 - 1.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default_position() {
        let camera = MapCamera::default();
        assert_eq!(camera.state(), CameraState { x: 0.0, y: 0.18, z: 0.08 });
    }

    #[test]
    fn altitude_stays_clamped_under_any_wheel_sequence() {
        let mut camera = MapCamera::default();
        for i in 0..200 {
            let delta = if (i / 7) % 3 == 0 { -120.0 } else { 53.0 };
            camera.zoom(delta);
            let y = camera.state().y;
            assert!((CAM_Y_MIN..=CAM_Y_MAX).contains(&y));
        }
        for _ in 0..100 {
            camera.zoom(1.0);
        }
        assert_eq!(camera.state().y, CAM_Y_MAX);
        for _ in 0..100 {
            camera.zoom(-1.0);
        }
        assert_eq!(camera.state().y, CAM_Y_MIN);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let mut camera = MapCamera::default();
        assert!(!camera.zoom(0.0));
        assert_eq!(camera.state().y, CAM_Y_DEFAULT);
    }

    #[test]
    fn pan_stays_within_margin_under_any_drag_sequence() {
        let mut camera = MapCamera::default();
        let viewport = Vec2::new(800.0, 600.0);
        let limit = camera.pan_limit();
        let drags = [
            Vec2::new(-900.0, 0.0),
            Vec2::new(4000.0, -3000.0),
            Vec2::new(-25.0, 12.0),
            Vec2::new(0.0, 9000.0),
        ];
        for i in 0..400 {
            camera.pan(drags[i % drags.len()], viewport);
            let s = camera.state();
            assert!(s.x.abs() <= limit.x + 1e-6);
            assert!(s.z.abs() <= limit.y + 1e-6);
        }
    }

    #[test]
    fn pan_scales_with_altitude_and_viewport() {
        let mut camera = MapCamera::default();
        camera.pan(Vec2::new(80.0, 0.0), Vec2::new(800.0, 600.0));
        let expected = -80.0 / 800.0 * CAM_Y_DEFAULT * PAN_SPEED_PER_ALTITUDE;
        assert!((camera.state().x - expected).abs() < 1e-6);
        assert_eq!(camera.state().z, CAM_START_Z);
    }

    #[test]
    fn zero_sized_viewport_does_not_pan() {
        let mut camera = MapCamera::default();
        assert!(!camera.pan(Vec2::new(10.0, 10.0), Vec2::new(0.0, 300.0)));
        assert_eq!(camera.state(), CameraState::default());
    }

    #[test]
    fn looks_ahead_and_down() {
        let camera = MapCamera::default();
        let forward = camera.transform().forward();
        assert!(forward.y < 0.0);
        assert!(forward.z < 0.0);
        assert!(forward.x.abs() < 1e-6);
    }

    #[test]
    fn centre_ray_points_at_look_target() {
        let camera = MapCamera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO, 1.5).unwrap();
        let to_target = (camera.look_target() - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn cursor_maps_to_ndc_corners() {
        let rect = Rect::new(100.0, 0.0, 500.0, 300.0);
        assert_eq!(cursor_to_ndc(Vec2::new(100.0, 0.0), rect), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(cursor_to_ndc(Vec2::new(500.0, 300.0), rect), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(cursor_to_ndc(Vec2::ZERO, Rect::new(0.0, 0.0, 0.0, 10.0)), None);
    }

    #[test]
    fn look_target_projects_to_viewport_centre() {
        let camera = MapCamera::default();
        let size = Vec2::new(1200.0, 800.0);
        let px = camera.world_to_viewport(camera.look_target(), size).unwrap();
        assert!((px - size * 0.5).length() < 1e-2);
        let behind = camera.state().position() + camera.transform().back() * 0.1;
        assert_eq!(camera.world_to_viewport(behind, size), None);
    }
}
