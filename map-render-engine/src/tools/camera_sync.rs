use bevy::prelude::*;

use crate::engine::camera::CameraState;
use crate::engine::scene::{MapEvent, SceneHandle, ViewId, ViewLayout};

/// Mirrors camera movement between the two split views.
///
/// The coordinator remembers which view last drove the pair and the state it
/// pushed. A report from the peer carrying that same state is the mirrored
/// move coming back and is dropped, so a view never re-applies its own state.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SplitViewCoordinator {
    pub enabled: bool,
    last: Option<(ViewId, CameraState)>,
}

impl SplitViewCoordinator {
    /// Peer view and state to apply for a camera move reported by `source`.
    pub fn report(&mut self, source: ViewId, state: CameraState) -> Option<(ViewId, CameraState)> {
        if !self.enabled {
            return None;
        }
        if let Some((last_source, last_state)) = self.last {
            if last_source != source && last_state == state {
                return None;
            }
        }
        self.last = Some((source, state));
        Some((source.other(), state))
    }
}

// Keeps the coordinator in step with the layout
pub fn sync_coordinator_with_layout(layout: Res<ViewLayout>, mut coordinator: ResMut<SplitViewCoordinator>) {
    if layout.is_changed() && coordinator.enabled != layout.split {
        coordinator.enabled = layout.split;
        if !layout.split {
            coordinator.last = None;
        }
    }
}

pub fn mirror_camera_system(
    mut map_events: EventReader<MapEvent>,
    mut coordinator: ResMut<SplitViewCoordinator>,
    mut handles: Query<&mut SceneHandle>,
) {
    for ev in map_events.read() {
        let MapEvent::CameraMoved { view, state } = ev else {
            continue;
        };
        let Some((target, state)) = coordinator.report(*view, *state) else {
            continue;
        };
        for mut handle in &mut handles {
            if handle.view == target && handle.camera.state() != state {
                handle.camera.apply_state(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AreaCatalog;
    use crate::engine::scene::ViewSettings;
    use crate::engine::terrain::TerrainShape;

    #[test]
    fn disabled_coordinator_ignores_moves() {
        let mut coordinator = SplitViewCoordinator::default();
        assert_eq!(coordinator.report(ViewId::Left, CameraState::default()), None);
        assert_eq!(coordinator.last, None);
    }

    #[test]
    fn move_is_forwarded_to_peer() {
        let mut coordinator = SplitViewCoordinator {
            enabled: true,
            ..default()
        };
        let state = CameraState { x: 0.05, y: 0.2, z: -0.01 };
        assert_eq!(coordinator.report(ViewId::Right, state), Some((ViewId::Left, state)));
        assert_eq!(coordinator.last, Some((ViewId::Right, state)));
    }

    #[test]
    fn mirrored_state_reported_back_is_dropped() {
        let mut coordinator = SplitViewCoordinator {
            enabled: true,
            ..default()
        };
        let state = CameraState { x: 0.02, y: 0.15, z: 0.0 };
        assert!(coordinator.report(ViewId::Left, state).is_some());
        assert_eq!(coordinator.report(ViewId::Right, state), None);

        let moved = CameraState { x: 0.03, ..state };
        assert_eq!(coordinator.report(ViewId::Right, moved), Some((ViewId::Left, moved)));
    }

    fn split_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<MapEvent>()
            .insert_resource(ViewLayout { split: true })
            .init_resource::<SplitViewCoordinator>()
            .add_systems(Update, (sync_coordinator_with_layout, mirror_camera_system).chain());

        let catalog = AreaCatalog::default();
        let shape = TerrainShape::default();
        for (view, seed) in [(ViewId::Left, 1), (ViewId::Right, 2)] {
            let handle = SceneHandle::with_seed(view, ViewSettings::for_view(view), &catalog, &shape, seed);
            app.world_mut().spawn(handle);
        }
        app
    }

    fn camera_of(app: &mut App, view: ViewId) -> CameraState {
        let world = app.world_mut();
        let mut query = world.query::<&SceneHandle>();
        query
            .iter(world)
            .find(|handle| handle.view == view)
            .map(|handle| handle.camera.state())
            .unwrap()
    }

    #[test]
    fn left_move_is_applied_to_right_view() {
        let mut app = split_app();
        let before_left = camera_of(&mut app, ViewId::Left);
        let state = CameraState {
            x: before_left.x + 0.01,
            y: before_left.y,
            z: before_left.z - 0.01,
        };

        app.world_mut().send_event(MapEvent::CameraMoved { view: ViewId::Left, state });
        app.update();

        assert_eq!(camera_of(&mut app, ViewId::Right), state);
        assert_eq!(camera_of(&mut app, ViewId::Left), before_left);

        // The right view reporting the mirrored state must not push it back.
        app.world_mut().send_event(MapEvent::CameraMoved { view: ViewId::Right, state });
        app.update();
        assert_eq!(camera_of(&mut app, ViewId::Left), before_left);
        assert_eq!(
            app.world().resource::<SplitViewCoordinator>().last,
            Some((ViewId::Left, state))
        );
    }

    #[test]
    fn single_view_layout_mirrors_nothing() {
        let mut app = split_app();
        app.insert_resource(ViewLayout { split: false });
        let before_right = camera_of(&mut app, ViewId::Right);
        let state = CameraState { x: 0.04, y: 0.2, z: 0.0 };

        app.world_mut().send_event(MapEvent::CameraMoved { view: ViewId::Left, state });
        app.update();

        assert_eq!(camera_of(&mut app, ViewId::Right), before_right);
    }
}
