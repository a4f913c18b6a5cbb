use bevy::prelude::*;
use constants::markers::HIT_RADIUS;

use crate::engine::scene::SceneHandle;

/// Distance along the ray to the first hit with a sphere, or None when missed.
/// A ray starting inside the sphere hits at its exit point.
pub fn ray_sphere_hit_t(ray_origin: Vec3, ray_direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let a = ray_direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let oc = ray_origin - center;
    let half_b = oc.dot(ray_direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    let far = (-half_b + root) / a;

    if far < 0.0 { return None; }
    Some(if near >= 0.0 { near } else { far })
}

/// Marker under the view's pointer, nearest to the camera.
///
/// Each marker is hit-tested as a sphere of `HIT_RADIUS` around its anchor;
/// no entity backs the hit volume. Nothing is pickable while markers are hidden or before the pointer has
/// entered the view.
pub fn pick_marker(handle: &SceneHandle) -> Option<usize> {
    if !handle.settings.show_markers {
        return None;
    }
    let ndc = handle.pointer.ndc?;
    let ray = handle.camera.ray_from_ndc(ndc, handle.aspect_ratio())?;
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut best: Option<(usize, f32)> = None;
    for (index, marker) in handle.markers.iter().enumerate() {
        if let Some(t) = ray_sphere_hit_t(origin, dir, marker.placement.anchor, HIT_RADIUS) {
            if best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((index, t));
            }
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_in_front_is_hit_at_near_surface() {
        let t = ray_sphere_hit_t(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -1.0), 0.25).unwrap();
        assert!((t - 0.75).abs() < 1e-6);
    }

    #[test]
    fn sphere_behind_is_missed() {
        assert!(ray_sphere_hit_t(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, 1.0), 0.25).is_none());
    }

    #[test]
    fn offset_sphere_is_missed() {
        assert!(ray_sphere_hit_t(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(1.0, 0.0, -1.0), 0.25).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_exit() {
        let t = ray_sphere_hit_t(Vec3::ZERO, Vec3::X, Vec3::ZERO, 0.5).unwrap();
        assert!((t - 0.5).abs() < 1e-6);
    }

    fn two_marker_handle() -> SceneHandle {
        use crate::engine::assets::AreaCatalog;
        use crate::engine::scene::{ViewId, ViewSettings};
        use crate::engine::terrain::TerrainShape;

        let catalog = AreaCatalog::from_json_str(include_str!("../../assets/data/areas.json")).unwrap();
        let mut handle = SceneHandle::with_seed(
            ViewId::Left,
            ViewSettings::default(),
            &catalog,
            &TerrainShape::default(),
            3,
        );
        handle.viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        handle.pointer.ndc = Some(Vec2::ZERO);
        let first = handle.markers[0].clone();
        handle.markers = vec![first.clone(), first];
        handle
    }

    fn place_on_centre_ray(handle: &mut SceneHandle, index: usize, distance: f32) {
        let ray = handle.camera.ray_from_ndc(Vec2::ZERO, handle.aspect_ratio()).unwrap();
        handle.markers[index].placement.anchor = ray.origin + ray.direction.as_vec3() * distance;
    }

    #[test]
    fn nearest_of_overlapping_markers_wins() {
        let mut handle = two_marker_handle();
        place_on_centre_ray(&mut handle, 0, 0.12);
        place_on_centre_ray(&mut handle, 1, 0.06);
        assert_eq!(pick_marker(&handle), Some(1));

        place_on_centre_ray(&mut handle, 0, 0.03);
        assert_eq!(pick_marker(&handle), Some(0));
    }

    #[test]
    fn hidden_markers_are_not_pickable() {
        let mut handle = two_marker_handle();
        place_on_centre_ray(&mut handle, 0, 0.05);
        handle.settings.show_markers = false;
        assert_eq!(pick_marker(&handle), None);
    }
}
