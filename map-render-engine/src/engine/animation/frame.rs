use bevy::prelude::*;
use bevy::math::FloatExt;
use constants::markers::{
    GLOW_HOVER_RATE, GLOW_HOVER_TARGET, GLOW_IDLE_RATE, GLOW_IDLE_TARGET, LABEL_HOVER_RATE,
    LABEL_HOVER_TARGET, LABEL_IDLE_RATE, LABEL_IDLE_TARGET, RUNE_SPIN_RATE,
};

use crate::engine::scene::SceneHandle;
use crate::engine::scene::markers::MarkerState;
use crate::engine::terrain::TerrainShape;
use crate::tools::picking::pick_marker;

/// What one frame update changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub ran: bool,
    pub hover_changed: bool,
    pub birds_recycled: usize,
    pub clouds_recycled: usize,
}

/// Advance a view by `delta` seconds: agents, rune spin, hover picking and
/// the eased label and glow opacities. A cancelled view is left untouched.
pub fn frame_update(handle: &mut SceneHandle, delta: f32, shape: &TerrainShape) -> FrameOutcome {
    if !handle.clock.is_running() {
        return FrameOutcome::default();
    }
    handle.clock.tick(delta);
    let dt = handle.clock.delta;
    let elapsed = handle.clock.elapsed;
    let mut outcome = FrameOutcome {
        ran: true,
        ..default()
    };

    let SceneHandle { birds, clouds, rng, .. } = handle;
    for bird in birds.iter_mut() {
        if bird.step(dt, elapsed, rng) {
            outcome.birds_recycled += 1;
        }
    }
    for cloud in clouds.iter_mut() {
        if cloud.step(dt, shape, rng) {
            outcome.clouds_recycled += 1;
        }
    }

    if handle.settings.marker_style.spins() {
        let spin = elapsed * RUNE_SPIN_RATE;
        for marker in &mut handle.markers {
            marker.spin = spin;
        }
    }

    let hovered = pick_marker(handle);
    ease_marker_opacity(&mut handle.markers, hovered);
    if hovered != handle.hovered {
        handle.hovered = hovered;
        outcome.hover_changed = true;
    }
    outcome
}

/// Ease every marker towards idle, then the hovered one towards its
/// highlight. The hovered marker therefore eases twice per frame.
pub fn ease_marker_opacity(markers: &mut [MarkerState], hovered: Option<usize>) {
    for marker in markers.iter_mut() {
        marker.label_opacity = marker.label_opacity.lerp(LABEL_IDLE_TARGET, LABEL_IDLE_RATE);
        marker.glow_opacity = marker.glow_opacity.lerp(GLOW_IDLE_TARGET, GLOW_IDLE_RATE);
    }
    if let Some(marker) = hovered.and_then(|index| markers.get_mut(index)) {
        marker.label_opacity = marker.label_opacity.lerp(LABEL_HOVER_TARGET, LABEL_HOVER_RATE);
        marker.glow_opacity = marker.glow_opacity.lerp(GLOW_HOVER_TARGET, GLOW_HOVER_RATE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AreaCatalog;
    use crate::engine::scene::{ViewId, ViewSettings};
    use constants::agents::{BIRD_RECYCLE_RADIUS, CUMULUS_COUNT, NIMBOSTRATUS_COUNT};
    use constants::markers::GLOW_INITIAL;

    fn catalog() -> AreaCatalog {
        AreaCatalog::from_json_str(include_str!("../../../assets/data/areas.json")).unwrap()
    }

    fn handle() -> SceneHandle {
        let mut handle = SceneHandle::with_seed(
            ViewId::Left,
            ViewSettings::default(),
            &catalog(),
            &TerrainShape::default(),
            11,
        );
        handle.viewport = Rect::new(0.0, 0.0, 1280.0, 720.0);
        handle
    }

    #[test]
    fn cancelled_view_does_not_advance() {
        let shape = TerrainShape::default();
        let mut h = handle();
        let before = h.birds[0].position;
        h.clock.cancel();
        let outcome = frame_update(&mut h, 0.5, &shape);
        assert!(!outcome.ran);
        assert_eq!(h.birds[0].position, before);
        assert_eq!(h.clock.elapsed, 0.0);
    }

    #[test]
    fn agents_stay_within_recycle_bounds() {
        let shape = TerrainShape::default();
        let mut h = handle();
        let mut recycled = 0;
        for _ in 0..2000 {
            let outcome = frame_update(&mut h, 0.1, &shape);
            recycled += outcome.birds_recycled;
            for bird in &h.birds {
                assert!(bird.position.length() <= BIRD_RECYCLE_RADIUS);
            }
        }
        assert!(recycled > 0);
        assert_eq!(h.birds.len(), constants::agents::BIRD_COUNT);
        assert_eq!(h.clouds.len(), CUMULUS_COUNT + NIMBOSTRATUS_COUNT);
    }

    #[test]
    fn shadows_follow_terrain() {
        let shape = TerrainShape::default();
        let mut h = handle();
        frame_update(&mut h, 1.0, &shape);
        for cloud in &h.clouds {
            if let Some(shadow) = cloud.shadow {
                assert_eq!(shadow.x, cloud.position.x);
                assert_eq!(shadow.z, cloud.position.z);
                let ground = shape.height_at(shadow.x, shadow.z);
                assert!((shadow.y - ground - constants::agents::CLOUD_SHADOW_LIFT).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn runes_spin_with_elapsed_time() {
        let shape = TerrainShape::default();
        let mut h = handle();
        frame_update(&mut h, 2.0, &shape);
        assert!((h.markers[0].spin - 2.0 * RUNE_SPIN_RATE).abs() < 1e-6);
    }

    #[test]
    fn idle_markers_ease_towards_idle_glow() {
        let mut markers = handle().markers;
        ease_marker_opacity(&mut markers, None);
        let expected = GLOW_INITIAL + (GLOW_IDLE_TARGET - GLOW_INITIAL) * GLOW_IDLE_RATE;
        assert!((markers[0].glow_opacity - expected).abs() < 1e-6);
        assert_eq!(markers[0].label_opacity, 0.0);
    }

    #[test]
    fn hovered_marker_eases_idle_then_highlight() {
        let mut markers = handle().markers;
        ease_marker_opacity(&mut markers, Some(1));
        let label = 0.0f32.lerp(LABEL_IDLE_TARGET, LABEL_IDLE_RATE).lerp(LABEL_HOVER_TARGET, LABEL_HOVER_RATE);
        assert!((markers[1].label_opacity - label).abs() < 1e-6);
        assert!(markers[1].glow_opacity > markers[0].glow_opacity);
        for _ in 0..200 {
            ease_marker_opacity(&mut markers, Some(1));
        }
        assert!(markers[1].label_opacity > 0.6);
        assert!(markers[0].label_opacity < 1e-3);
    }

    #[test]
    fn pointer_outside_view_hovers_nothing() {
        let shape = TerrainShape::default();
        let mut h = handle();
        let outcome = frame_update(&mut h, 0.016, &shape);
        assert!(!outcome.hover_changed);
        assert_eq!(h.hovered, None);
    }
}
