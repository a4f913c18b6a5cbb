use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bevy::asset::RenderAssetUsages;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::ecs::system::SystemParam;
use bevy::pbr::wireframe::Wireframe;
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::render::camera::Viewport;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::RenderLayers;
use bevy::ui::UiTargetCamera;
use constants::agents::{CLOUD_RASTER_SIZE, CLOUD_RASTER_VARIANTS, CLOUD_SHADOW_SCALE};
use constants::camera::{FAR, FOV_Y_DEGREES, NEAR};
use constants::markers::{GLOW_RADIUS, LABEL_FONT_SIZE, RUNE_THICKNESS, STEM_OPACITY, STEM_RADIUS};
use constants::render_settings::*;
use constants::terrain::{OCEAN_SIZE, OCEAN_Y};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::handle::{BirdParts, CloudParts, MarkerParts, SceneHandle};
use super::markers::{MarkerPart, PartShape, PartTint, flame_outline, marker_parts};
use super::settings::{SceneTweaks, ViewId};
use crate::engine::agents::cloud_raster::{cloud_alpha, cloud_image};
use crate::engine::assets::AreaCatalog;
use crate::engine::terrain::{EdgeFadeMask, TerrainGrid, TerrainShape};

/// Camera rendering one map view.
#[derive(Component, Debug, Clone, Copy)]
pub struct ViewCamera {
    pub view: ViewId,
}

pub fn visibility(shown: bool) -> Visibility {
    if shown { Visibility::Inherited } else { Visibility::Hidden }
}

/// Camera viewport in physical pixels, or None when the view has no area.
pub fn physical_viewport(rect: Rect, scale_factor: f32) -> Option<Viewport> {
    let min = (rect.min * scale_factor).round().max(Vec2::ZERO);
    let size = (rect.size() * scale_factor).round();
    if size.x < 1.0 || size.y < 1.0 {
        return None;
    }
    Some(Viewport {
        physical_position: min.as_uvec2(),
        physical_size: size.as_uvec2(),
        ..default()
    })
}

pub fn directional_illuminance(intensity: f32) -> f32 {
    intensity * DIRECTIONAL_LUX_PER_UNIT
}

pub fn ambient_brightness(intensity: f32) -> f32 {
    intensity * AMBIENT_BRIGHTNESS_PER_UNIT
}

pub fn fog_falloff(tweaks: &SceneTweaks) -> FogFalloff {
    FogFalloff::ExponentialSquared {
        density: tweaks.fog_density,
    }
}

/// Everything needed to spawn and despawn the entities of a view.
#[derive(SystemParam)]
pub struct SceneAssets<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
    pub images: ResMut<'w, Assets<Image>>,
    pub asset_server: Res<'w, AssetServer>,
}

impl SceneAssets<'_, '_> {
    fn add_mesh(&mut self, handle: &mut SceneHandle, mesh: impl Into<Mesh>) -> Handle<Mesh> {
        let mesh = self.meshes.add(mesh);
        handle.parts.meshes.push(mesh.clone());
        mesh
    }

    fn add_material(&mut self, handle: &mut SceneHandle, material: StandardMaterial) -> Handle<StandardMaterial> {
        let material = self.materials.add(material);
        handle.parts.materials.push(material.clone());
        material
    }

    /// Spawn the camera, terrain, lights, markers, agents and UI of a view.
    ///
    /// The handle's viewport must already be set; its map image is requested
    /// unless an image is already bound.
    pub fn build_view(
        &mut self,
        handle: &mut SceneHandle,
        catalog: &AreaCatalog,
        shape: &TerrainShape,
        fade: &EdgeFadeMask,
        scale_factor: f32,
    ) {
        let layer = RenderLayers::layer(handle.view.render_layer());

        self.spawn_camera(handle, layer.clone(), scale_factor);
        self.spawn_terrain(handle, shape, fade, layer.clone());
        self.spawn_lights(handle, layer.clone());
        self.spawn_markers(handle, catalog, layer.clone());
        self.spawn_birds(handle, layer.clone());
        self.spawn_clouds(handle, layer);

        if handle.map.path != handle.settings.map || handle.map.texture().is_none() {
            handle.map.request(&handle.settings.map, &self.asset_server);
        }

        info!(
            "Built {} view: {} segments, {} markers, {} birds, {} clouds (generation {})",
            handle.view.as_str(),
            handle.settings.segments,
            handle.markers.len(),
            handle.birds.len(),
            handle.clouds.len(),
            handle.generation
        );
    }

    fn spawn_camera(&mut self, handle: &mut SceneHandle, layer: RenderLayers, scale_factor: f32) {
        let tweaks = handle.settings.tweaks;
        let order = match handle.view {
            ViewId::Left => 0,
            ViewId::Right => 1,
        };
        let camera = self
            .commands
            .spawn((
                Camera3d::default(),
                Camera {
                    order,
                    viewport: physical_viewport(handle.viewport, scale_factor),
                    clear_color: ClearColorConfig::Custom(BACKGROUND),
                    ..default()
                },
                Projection::Perspective(PerspectiveProjection {
                    fov: FOV_Y_DEGREES.to_radians(),
                    near: NEAR,
                    far: FAR,
                    ..default()
                }),
                Tonemapping::AcesFitted,
                handle.camera.transform(),
                DistanceFog {
                    color: BACKGROUND,
                    falloff: fog_falloff(&tweaks),
                    ..default()
                },
                AmbientLight {
                    color: Color::WHITE,
                    brightness: ambient_brightness(tweaks.ambient_intensity),
                    ..default()
                },
                layer,
                ViewCamera { view: handle.view },
            ))
            .id();
        handle.parts.camera = Some(camera);

        let ui_root = self
            .commands
            .spawn((
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                UiTargetCamera(camera),
            ))
            .id();
        handle.parts.ui_root = Some(ui_root);

        let show_overlay = handle.settings.show_overlay;
        for (alpha, at_top) in [(OVERLAY_TOP_ALPHA, true), (OVERLAY_BOTTOM_ALPHA, false)] {
            let band = self
                .commands
                .spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(0.0),
                        right: Val::Px(0.0),
                        top: if at_top { Val::Px(0.0) } else { Val::Auto },
                        bottom: if at_top { Val::Auto } else { Val::Px(0.0) },
                        height: Val::Percent(OVERLAY_BAND_PERCENT),
                        ..default()
                    },
                    BackgroundColor(Color::BLACK.with_alpha(alpha)),
                    visibility(show_overlay),
                    ChildOf(ui_root),
                ))
                .id();
            handle.parts.overlay.push(band);
        }
    }

    fn spawn_terrain(&mut self, handle: &mut SceneHandle, shape: &TerrainShape, fade: &EdgeFadeMask, layer: RenderLayers) {
        let settings = handle.settings.clone();
        let grid = TerrainGrid::build(shape, settings.segments, fade);
        let mesh = self.add_mesh(handle, grid.into_mesh());
        let texture = if settings.show_texture { handle.map.texture() } else { None };
        let material = self.add_material(
            handle,
            StandardMaterial {
                base_color: TERRAIN_BASE,
                base_color_texture: texture,
                perceptual_roughness: settings.tweaks.terrain_roughness,
                metallic: settings.tweaks.terrain_metalness,
                alpha_mode: AlphaMode::Blend,
                ..default()
            },
        );
        let mut terrain = self.commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material.clone()),
            Transform::IDENTITY,
            layer.clone(),
        ));
        if settings.wireframe {
            terrain.insert(Wireframe);
        }
        handle.parts.terrain = Some(terrain.id());
        handle.parts.terrain_material = Some(material);

        let ocean_mesh = self.add_mesh(handle, Plane3d::default().mesh().size(OCEAN_SIZE, OCEAN_SIZE));
        let ocean_material = self.add_material(
            handle,
            StandardMaterial {
                base_color: OCEAN,
                perceptual_roughness: settings.tweaks.ocean_roughness,
                metallic: settings.tweaks.ocean_metalness,
                ..default()
            },
        );
        let ocean = self
            .commands
            .spawn((
                Mesh3d(ocean_mesh),
                MeshMaterial3d(ocean_material.clone()),
                Transform::from_xyz(0.0, OCEAN_Y, 0.0),
                layer,
            ))
            .id();
        handle.parts.ocean = Some(ocean);
        handle.parts.ocean_material = Some(ocean_material);
    }

    fn spawn_lights(&mut self, handle: &mut SceneHandle, layer: RenderLayers) {
        let tweaks = handle.settings.tweaks;
        let sun = self
            .commands
            .spawn((
                DirectionalLight {
                    color: SUN,
                    illuminance: directional_illuminance(tweaks.sun_intensity),
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(Vec3::from(SUN_POSITION)).looking_at(Vec3::ZERO, Vec3::Y),
                layer.clone(),
            ))
            .id();
        let fill = self
            .commands
            .spawn((
                DirectionalLight {
                    color: FILL,
                    illuminance: directional_illuminance(FILL_INTENSITY),
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(Vec3::from(FILL_POSITION)).looking_at(Vec3::ZERO, Vec3::Y),
                layer,
            ))
            .id();
        handle.parts.sun = Some(sun);
        handle.parts.fill = Some(fill);
    }

    fn spawn_markers(&mut self, handle: &mut SceneHandle, catalog: &AreaCatalog, layer: RenderLayers) {
        let shown = visibility(handle.settings.show_markers);
        let style = handle.settings.marker_style;
        let Some(ui_root) = handle.parts.ui_root else {
            return;
        };

        let stem_material = self.add_material(handle, unlit(STEM.with_alpha(STEM_OPACITY)));
        let glow_mesh = self.add_mesh(handle, Sphere::new(GLOW_RADIUS).mesh().uv(16, 16));

        for index in 0..handle.markers.len() {
            let marker = handle.markers[index].clone();
            let color = marker.category.color();
            let placement = marker.placement;
            let title = catalog.get(marker.area).map(|area| area.title.clone()).unwrap_or_default();

            let visual = self
                .commands
                .spawn((
                    Transform::from_translation(placement.anchor).with_rotation(Quat::from_rotation_y(marker.spin)),
                    shown,
                    layer.clone(),
                ))
                .id();
            for part in marker_parts(style, marker.category) {
                self.spawn_marker_part(handle, &part, color, visual, layer.clone());
            }

            let stem_mesh = self.add_mesh(handle, Cylinder::new(STEM_RADIUS, placement.stem_height()));
            let stem = self
                .commands
                .spawn((
                    Mesh3d(stem_mesh),
                    MeshMaterial3d(stem_material.clone()),
                    Transform::from_translation(placement.stem_center()),
                    shown,
                    layer.clone(),
                ))
                .id();

            let glow_material = self.add_material(handle, unlit(color.with_alpha(marker.glow_opacity)));
            let glow = self
                .commands
                .spawn((
                    Mesh3d(glow_mesh.clone()),
                    MeshMaterial3d(glow_material.clone()),
                    Transform::from_translation(placement.anchor),
                    shown,
                    layer.clone(),
                ))
                .id();

            let label = self
                .commands
                .spawn((
                    Text::new(title),
                    TextFont {
                        font_size: LABEL_FONT_SIZE,
                        ..default()
                    },
                    TextColor(LABEL.with_alpha(marker.label_opacity)),
                    TextLayout::new_with_justify(JustifyText::Center),
                    Node {
                        position_type: PositionType::Absolute,
                        width: Val::Px(LABEL_WIDTH_PX),
                        ..default()
                    },
                    shown,
                    ChildOf(ui_root),
                ))
                .id();

            handle.parts.markers.push(MarkerParts {
                visual,
                stem,
                glow,
                glow_material,
                label,
            });
        }
    }

    fn spawn_marker_part(
        &mut self,
        handle: &mut SceneHandle,
        part: &MarkerPart,
        category_color: Color,
        parent: Entity,
        layer: RenderLayers,
    ) {
        let mesh: Mesh = match part.shape {
            PartShape::Bar { length, width } => Cuboid::new(length, RUNE_THICKNESS, width).into(),
            PartShape::Ring { radius, tube } => Torus {
                minor_radius: tube,
                major_radius: radius,
            }
            .mesh()
            .minor_resolution(6)
            .major_resolution(32)
            .into(),
            PartShape::Sphere { radius } => Sphere::new(radius).mesh().uv(12, 8),
            PartShape::Cone { radius, height } => Cone { radius, height }.into(),
            PartShape::Frustum { top, bottom, height } => ConicalFrustum {
                radius_top: top,
                radius_bottom: bottom,
                height,
            }
            .into(),
            PartShape::Flame { size } => flame_mesh(size),
        };
        let color = match part.tint {
            PartTint::Category => category_color,
            PartTint::White => Color::WHITE,
        };
        let mesh = self.add_mesh(handle, mesh);
        let material = self.add_material(handle, unlit(color.with_alpha(part.opacity)));
        self.commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(part.translation).with_rotation(part.rotation),
            layer,
            ChildOf(parent),
        ));
    }

    fn spawn_birds(&mut self, handle: &mut SceneHandle, layer: RenderLayers) {
        let shown = visibility(handle.settings.show_birds);
        let body_mesh = self.add_mesh(handle, Cone { radius: 0.0005, height: 0.003 }.mesh().resolution(4));
        let wing_mesh = self.add_mesh(handle, Plane3d::new(Vec3::Y, Vec2::new(0.0025, 0.0006)));
        let body_material = self.add_material(handle, unlit(BIRD));
        let wing_material = self.add_material(
            handle,
            StandardMaterial {
                cull_mode: None,
                double_sided: true,
                ..unlit(BIRD.with_alpha(BIRD_WING_OPACITY))
            },
        );

        for i in 0..handle.birds.len() {
            let bird = handle.birds[i].clone();
            let body = self
                .commands
                .spawn((
                    Transform::from_translation(bird.position)
                        .with_rotation(bird.rotation())
                        .with_scale(Vec3::splat(bird.scale)),
                    shown,
                    layer.clone(),
                ))
                .id();
            // Cone tip points along -Z, the flight direction.
            self.commands.spawn((
                Mesh3d(body_mesh.clone()),
                MeshMaterial3d(body_material.clone()),
                Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                layer.clone(),
                ChildOf(body),
            ));
            let mut wing = |x: f32, flap: f32| {
                self.commands
                    .spawn((
                        Mesh3d(wing_mesh.clone()),
                        MeshMaterial3d(wing_material.clone()),
                        Transform::from_xyz(x, 0.0, 0.0).with_rotation(Quat::from_rotation_z(flap)),
                        layer.clone(),
                        ChildOf(body),
                    ))
                    .id()
            };
            let left_wing = wing(-0.002, bird.flap);
            let right_wing = wing(0.002, -bird.flap);
            handle.parts.birds.push(BirdParts {
                body,
                left_wing,
                right_wing,
            });
        }
    }

    fn spawn_clouds(&mut self, handle: &mut SceneHandle, layer: RenderLayers) {
        let shown = visibility(handle.settings.show_clouds);

        let mut sprites = Vec::with_capacity(CLOUD_RASTER_VARIANTS);
        for _ in 0..CLOUD_RASTER_VARIANTS {
            let alpha = cloud_alpha(CLOUD_RASTER_SIZE, &mut handle.rng);
            let image = self.images.add(cloud_image(&alpha, CLOUD_RASTER_SIZE, [255, 255, 255]));
            handle.parts.images.push(image.clone());
            sprites.push(image);
        }

        for i in 0..handle.clouds.len() {
            let cloud = handle.clouds[i].clone();
            let profile = cloud.profile;
            let sprite = sprites[cloud.sprite % sprites.len()].clone();

            let mesh = self.add_mesh(
                handle,
                Plane3d::new(Vec3::Y, Vec2::new(profile.width * 0.5, profile.depth * 0.5)),
            );
            let material = self.add_material(handle, sprite_material(Color::WHITE.with_alpha(profile.opacity()), sprite.clone()));
            let cloud_entity = self
                .commands
                .spawn((
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material),
                    Transform::from_translation(cloud.position),
                    shown,
                    layer.clone(),
                ))
                .id();

            let shadow = cloud.shadow.map(|position| {
                let material = self.add_material(
                    handle,
                    StandardMaterial {
                        depth_bias: 1.0,
                        ..sprite_material(Color::BLACK.with_alpha(profile.shadow_opacity()), sprite)
                    },
                );
                self.commands
                    .spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(material),
                        Transform::from_translation(position).with_scale(Vec3::new(
                            CLOUD_SHADOW_SCALE,
                            1.0,
                            CLOUD_SHADOW_SCALE,
                        )),
                        shown,
                        layer.clone(),
                    ))
                    .id()
            });

            handle.parts.clouds.push(CloudParts {
                cloud: cloud_entity,
                shadow,
            });
        }
    }

    /// Stop the view's frame loop, release its GPU assets and despawn its
    /// entities, in that order.
    pub fn teardown_view(&mut self, handle: &mut SceneHandle) {
        handle.clock.cancel();

        let parts = std::mem::take(&mut handle.parts);
        for mesh in &parts.meshes {
            self.meshes.remove(mesh);
        }
        for material in &parts.materials {
            self.materials.remove(material);
        }
        for image in &parts.images {
            self.images.remove(image);
        }
        handle.map.release();

        for entity in parts.root_entities() {
            self.commands.entity(entity).despawn();
        }
        info!("Tore down {} view (generation {})", handle.view.as_str(), handle.generation);
    }

    /// Replace a view with a fresh build under its current settings.
    ///
    /// Camera position, viewport and the bound map image carry over; agents,
    /// hover and selection start over.
    pub fn rebuild_view(
        &mut self,
        handle: &mut SceneHandle,
        catalog: &AreaCatalog,
        shape: &TerrainShape,
        fade: &EdgeFadeMask,
        scale_factor: f32,
    ) {
        let map = std::mem::take(&mut handle.map);
        self.teardown_view(handle);

        let rng = StdRng::seed_from_u64(handle.rng.r#gen());
        let mut next = SceneHandle::new(handle.view, handle.settings.clone(), catalog, shape, rng);
        next.generation = handle.generation + 1;
        next.camera.apply_state(handle.camera.state());
        next.viewport = handle.viewport;
        next.map = map;
        *handle = next;

        self.build_view(handle, catalog, shape, fade, scale_factor);
    }
}

fn unlit(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        unlit: true,
        alpha_mode: if color.alpha() < 1.0 { AlphaMode::Blend } else { AlphaMode::Opaque },
        ..default()
    }
}

fn sprite_material(color: Color, sprite: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(sprite),
        cull_mode: None,
        double_sided: true,
        fog_enabled: false,
        alpha_mode: AlphaMode::Blend,
        ..unlit(color)
    }
}

/// Flat flame glyph: a fan around the outline's centroid, facing up.
pub fn flame_mesh(size: f32) -> Mesh {
    let outline = flame_outline(size, 8);
    let center = outline.iter().copied().sum::<Vec2>() / outline.len().max(1) as f32;

    let mut positions = Vec::with_capacity(outline.len() + 1);
    positions.push([center.x, 0.0, center.y]);
    positions.extend(outline.iter().map(|p| [p.x, 0.0, p.y]));
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    let uvs = vec![[0.5, 0.5]; positions.len()];

    let n = outline.len() as u32;
    let mut indices = Vec::with_capacity(outline.len() * 3);
    for i in 0..n {
        let a = 1 + i;
        let b = 1 + (i + 1) % n;
        // Counter-clockwise seen from +Y.
        indices.extend_from_slice(&[0, b, a]);
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_is_scaled_to_physical_pixels() {
        let viewport = physical_viewport(Rect::new(640.0, 0.0, 1280.0, 720.0), 2.0).unwrap();
        assert_eq!(viewport.physical_position, UVec2::new(1280, 0));
        assert_eq!(viewport.physical_size, UVec2::new(1280, 1440));
    }

    #[test]
    fn empty_viewport_is_dropped() {
        assert!(physical_viewport(Rect::default(), 1.0).is_none());
    }

    #[test]
    fn flame_mesh_is_a_closed_fan() {
        let mesh = flame_mesh(0.002);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 32 * 3);
        assert!(indices.iter().all(|&i| (i as usize) < mesh.count_vertices()));
    }
}
