use bevy::prelude::*;
use constants::markers::LABEL_FONT_SIZE;
use constants::render_settings::LABEL_WIDTH_PX;

use super::frame::frame_update;
use crate::engine::assets::AreaCatalog;
use crate::engine::scene::{MapEvent, SceneHandle};
use crate::engine::terrain::TerrainShape;

// Runs the per-view frame update and reports hover changes
pub fn advance_views_system(
    time: Res<Time>,
    shape: Res<TerrainShape>,
    catalog: Res<AreaCatalog>,
    mut handles: Query<&mut SceneHandle>,
    mut map_events: EventWriter<MapEvent>,
) {
    let delta = time.delta_secs();
    for mut handle in &mut handles {
        let outcome = frame_update(&mut handle, delta, &shape);
        if outcome.hover_changed {
            let area_id = handle.area_id(&catalog, handle.hovered).map(str::to_owned);
            map_events.write(MapEvent::HoverChanged {
                view: handle.view,
                area_id,
            });
        }
    }
}

// Copies camera, marker and agent state onto the spawned transforms
pub fn sync_view_transforms_system(handles: Query<&SceneHandle>, mut transforms: Query<&mut Transform>) {
    for handle in &handles {
        let parts = &handle.parts;

        if let Some(camera) = parts.camera {
            if let Ok(mut transform) = transforms.get_mut(camera) {
                *transform = handle.camera.transform();
            }
        }

        for (marker, entities) in handle.markers.iter().zip(&parts.markers) {
            if let Ok(mut transform) = transforms.get_mut(entities.visual) {
                transform.rotation = Quat::from_rotation_y(marker.spin);
            }
        }

        for (bird, entities) in handle.birds.iter().zip(&parts.birds) {
            if let Ok(mut transform) = transforms.get_mut(entities.body) {
                transform.translation = bird.position;
                transform.rotation = bird.rotation();
            }
            if let Ok(mut transform) = transforms.get_mut(entities.left_wing) {
                transform.rotation = Quat::from_rotation_z(bird.flap);
            }
            if let Ok(mut transform) = transforms.get_mut(entities.right_wing) {
                transform.rotation = Quat::from_rotation_z(-bird.flap);
            }
        }

        for (cloud, entities) in handle.clouds.iter().zip(&parts.clouds) {
            if let Ok(mut transform) = transforms.get_mut(entities.cloud) {
                transform.translation = cloud.position;
            }
            if let (Some(shadow), Some(entity)) = (cloud.shadow, entities.shadow) {
                if let Ok(mut transform) = transforms.get_mut(entity) {
                    transform.translation = shadow;
                }
            }
        }
    }
}

// Glow material alpha, label alpha and label screen position
pub fn sync_marker_overlays_system(
    handles: Query<&SceneHandle>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut labels: Query<(&mut Node, &mut TextColor)>,
) {
    for handle in &handles {
        let size = handle.viewport_size();
        for (marker, entities) in handle.markers.iter().zip(&handle.parts.markers) {
            let stale = materials
                .get(&entities.glow_material)
                .is_some_and(|m| (m.base_color.alpha() - marker.glow_opacity).abs() > 1e-4);
            if stale {
                if let Some(material) = materials.get_mut(&entities.glow_material) {
                    material.base_color.set_alpha(marker.glow_opacity);
                }
            }

            let Ok((mut node, mut color)) = labels.get_mut(entities.label) else {
                continue;
            };
            if (color.0.alpha() - marker.label_opacity).abs() > 1e-4 {
                color.0.set_alpha(marker.label_opacity);
            }
            match handle.camera.world_to_viewport(marker.placement.label, size) {
                Some(px) => {
                    node.left = Val::Px(px.x - LABEL_WIDTH_PX * 0.5);
                    node.top = Val::Px(px.y - LABEL_FONT_SIZE);
                }
                None => {
                    node.left = Val::Px(-LABEL_WIDTH_PX);
                    node.top = Val::Px(-LABEL_FONT_SIZE * 2.0);
                }
            }
        }
    }
}
