use bevy::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::pbr::wireframe::Wireframe;
use bevy::pbr::DistanceFog;
use bevy::render::camera::Viewport;
use bevy::window::PrimaryWindow;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::builder::{
    SceneAssets, ViewCamera, ambient_brightness, directional_illuminance, fog_falloff,
    physical_viewport, visibility,
};
use super::events::{MapEvent, ViewRequest};
use super::handle::SceneHandle;
use super::settings::{ViewId, ViewLayout, ViewSettings};
use crate::engine::assets::{AreaCatalog, TextureStatus};
use crate::engine::terrain::{EdgeFadeMask, TerrainShape};

/// Requested settings of both views. The right view keeps its settings while
/// split mode is off so they apply when it is spawned again.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewConfigs {
    pub left: ViewSettings,
    pub right: ViewSettings,
}

impl Default for ViewConfigs {
    fn default() -> Self {
        Self {
            left: ViewSettings::for_view(ViewId::Left),
            right: ViewSettings::for_view(ViewId::Right),
        }
    }
}

impl ViewConfigs {
    pub fn get(&self, view: ViewId) -> &ViewSettings {
        match view {
            ViewId::Left => &self.left,
            ViewId::Right => &self.right,
        }
    }

    pub fn set(&mut self, view: ViewId, settings: ViewSettings) {
        match view {
            ViewId::Left => self.left = settings,
            ViewId::Right => self.right = settings,
        }
    }
}

/// Shared inputs of every view build.
#[derive(SystemParam)]
pub struct SceneInputs<'w, 's> {
    pub catalog: Res<'w, AreaCatalog>,
    pub shape: Res<'w, TerrainShape>,
    pub fade: Res<'w, EdgeFadeMask>,
    pub windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

impl SceneInputs<'_, '_> {
    /// Logical window size and scale factor; zero size without a window.
    pub fn window_metrics(&self) -> (Vec2, f32) {
        match self.windows.single() {
            Ok(window) => (window.size(), window.scale_factor()),
            Err(_) => (Vec2::ZERO, 1.0),
        }
    }
}

/// Components adjusted in place by settings changes.
#[derive(SystemParam)]
pub struct ViewComponents<'w, 's> {
    pub visibilities: Query<'w, 's, &'static mut Visibility>,
    pub lights: Query<'w, 's, &'static mut DirectionalLight>,
    pub environments: Query<'w, 's, (&'static mut AmbientLight, &'static mut DistanceFog)>,
}

pub fn spawn_view(
    assets: &mut SceneAssets,
    inputs: &SceneInputs,
    view: ViewId,
    settings: ViewSettings,
    viewport: Rect,
) -> Entity {
    let (_, scale_factor) = inputs.window_metrics();
    let mut handle = SceneHandle::new(view, settings, &inputs.catalog, &inputs.shape, StdRng::from_entropy());
    handle.viewport = viewport;
    assets.build_view(&mut handle, &inputs.catalog, &inputs.shape, &inputs.fade, scale_factor);
    assets
        .commands
        .spawn((handle, Name::new(format!("{} map view", view.as_str()))))
        .id()
}

// Spawns one view per layout slot
pub fn spawn_layout_views(
    mut assets: SceneAssets,
    inputs: SceneInputs,
    layout: Res<ViewLayout>,
    configs: Res<ViewConfigs>,
) {
    let (window, _) = inputs.window_metrics();
    for &view in layout.views() {
        let viewport = layout.viewport_rect(view, window);
        spawn_view(&mut assets, &inputs, view, configs.get(view).clone(), viewport);
    }
}

/// Move a live view to `next`, choosing the cheapest update path.
pub fn apply_settings(
    handle: &mut SceneHandle,
    next: ViewSettings,
    assets: &mut SceneAssets,
    components: &mut ViewComponents,
    inputs: &SceneInputs,
) {
    let change = handle.settings.diff(&next);
    if change.is_empty() {
        return;
    }
    handle.settings = next;

    if change.rebuild {
        let (_, scale_factor) = inputs.window_metrics();
        assets.rebuild_view(handle, &inputs.catalog, &inputs.shape, &inputs.fade, scale_factor);
        return;
    }
    if change.map {
        handle.map.request(&handle.settings.map, &assets.asset_server);
    }
    if change.material {
        apply_material(handle, assets);
    }
    if change.visibility {
        apply_visibility(handle, &mut components.visibilities);
    }
    if change.tweaks {
        apply_tweaks(handle, assets, components);
    }
}

fn apply_material(handle: &SceneHandle, assets: &mut SceneAssets) {
    if let Some(terrain) = handle.parts.terrain {
        if handle.settings.wireframe {
            assets.commands.entity(terrain).insert(Wireframe);
        } else {
            assets.commands.entity(terrain).remove::<Wireframe>();
        }
    }
    bind_map_texture(handle, &mut assets.materials);
}

fn bind_map_texture(handle: &SceneHandle, materials: &mut Assets<StandardMaterial>) {
    let Some(material) = handle.parts.terrain_material.as_ref().and_then(|m| materials.get_mut(m)) else {
        return;
    };
    material.base_color_texture = if handle.settings.show_texture {
        handle.map.texture()
    } else {
        None
    };
}

pub fn apply_visibility(handle: &SceneHandle, visibilities: &mut Query<&mut Visibility>) {
    let settings = &handle.settings;
    let parts = &handle.parts;
    let mut set = |entity: Entity, shown: bool| {
        if let Ok(mut current) = visibilities.get_mut(entity) {
            *current = visibility(shown);
        }
    };

    for marker in &parts.markers {
        for entity in [marker.visual, marker.stem, marker.glow, marker.label] {
            set(entity, settings.show_markers);
        }
    }
    for &band in &parts.overlay {
        set(band, settings.show_overlay);
    }
    for bird in &parts.birds {
        set(bird.body, settings.show_birds);
    }
    for cloud in &parts.clouds {
        set(cloud.cloud, settings.show_clouds);
        if let Some(shadow) = cloud.shadow {
            set(shadow, settings.show_clouds);
        }
    }
}

fn apply_tweaks(handle: &SceneHandle, assets: &mut SceneAssets, components: &mut ViewComponents) {
    let tweaks = handle.settings.tweaks;
    let parts = &handle.parts;

    if let Some(material) = parts.terrain_material.as_ref().and_then(|m| assets.materials.get_mut(m)) {
        material.perceptual_roughness = tweaks.terrain_roughness;
        material.metallic = tweaks.terrain_metalness;
    }
    if let Some(material) = parts.ocean_material.as_ref().and_then(|m| assets.materials.get_mut(m)) {
        material.perceptual_roughness = tweaks.ocean_roughness;
        material.metallic = tweaks.ocean_metalness;
    }
    if let Some(mut sun) = parts.sun.and_then(|e| components.lights.get_mut(e).ok()) {
        sun.illuminance = directional_illuminance(tweaks.sun_intensity);
    }
    if let Some((mut ambient, mut fog)) = parts.camera.and_then(|e| components.environments.get_mut(e).ok()) {
        ambient.brightness = ambient_brightness(tweaks.ambient_intensity);
        fog.falloff = fog_falloff(&tweaks);
    }
}

// Applies configuration requests from the page to the live views
pub fn apply_view_requests_system(
    mut requests: EventReader<ViewRequest>,
    mut assets: SceneAssets,
    mut components: ViewComponents,
    inputs: SceneInputs,
    mut handles: Query<(Entity, &mut SceneHandle)>,
    mut layout: ResMut<ViewLayout>,
    mut configs: ResMut<ViewConfigs>,
    mut map_events: EventWriter<MapEvent>,
) {
    let mut spawn_right = false;

    for request in requests.read() {
        match request {
            ViewRequest::Settings { view, settings } => {
                if !ViewSettings::segments_supported(settings.segments) {
                    warn!(
                        "Ignoring unsupported resolution {} for {} view",
                        settings.segments,
                        view.as_str()
                    );
                    continue;
                }
                configs.set(*view, settings.clone());
            }
            ViewRequest::Tweaks { view, tweaks } => {
                let mut settings = configs.get(*view).clone();
                settings.tweaks = *tweaks;
                configs.set(*view, settings);
            }
            ViewRequest::Split { enabled } => {
                if layout.split == *enabled {
                    continue;
                }
                layout.split = *enabled;
                info!("Split view {}", if *enabled { "enabled" } else { "disabled" });
                if *enabled {
                    spawn_right = true;
                } else {
                    spawn_right = false;
                    for (entity, mut handle) in &mut handles {
                        if handle.view == ViewId::Right {
                            assets.teardown_view(&mut handle);
                            assets.commands.entity(entity).despawn();
                        }
                    }
                }
                continue;
            }
            ViewRequest::ClearSelection { view } => {
                for (_, mut handle) in &mut handles {
                    if handle.view == *view && handle.selected.is_some() {
                        handle.selected = None;
                        map_events.write(MapEvent::AreaSelected {
                            view: *view,
                            area_id: None,
                        });
                    }
                }
                continue;
            }
        }

        let view = match request {
            ViewRequest::Settings { view, .. } | ViewRequest::Tweaks { view, .. } => *view,
            _ => continue,
        };
        for (_, mut handle) in &mut handles {
            if handle.view == view && handle.clock.is_running() {
                apply_settings(&mut handle, configs.get(view).clone(), &mut assets, &mut components, &inputs);
            }
        }
    }

    if spawn_right && layout.split {
        let (window, _) = inputs.window_metrics();
        let viewport = layout.viewport_rect(ViewId::Right, window);
        spawn_view(&mut assets, &inputs, ViewId::Right, configs.right.clone(), viewport);
    }
}

// Binds map images as they finish loading and reports their status
pub fn poll_map_textures_system(
    asset_server: Res<AssetServer>,
    mut handles: Query<&mut SceneHandle>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut map_events: EventWriter<MapEvent>,
) {
    for mut handle in &mut handles {
        let Some(status) = handle.map.poll(&asset_server) else {
            continue;
        };
        if status == TextureStatus::Loaded {
            info!("Map texture '{}' bound to {} view", handle.map.path, handle.view.as_str());
            bind_map_texture(&handle, &mut materials);
        }
        map_events.write(MapEvent::TextureStatus {
            view: handle.view,
            path: handle.map.path.clone(),
            status,
        });
    }
}

fn same_viewport(a: &Option<Viewport>, b: &Option<Viewport>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.physical_position == b.physical_position && a.physical_size == b.physical_size,
        _ => false,
    }
}

// Keeps view rects and camera viewports in step with the window and layout
pub fn update_viewports_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    layout: Res<ViewLayout>,
    mut handles: Query<&mut SceneHandle>,
    mut cameras: Query<&mut Camera, With<ViewCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = window.size();
    let scale_factor = window.scale_factor();

    for mut handle in &mut handles {
        let rect = layout.viewport_rect(handle.view, size);
        if handle.viewport != rect {
            debug!("{} view viewport -> {:?}", handle.view.as_str(), rect);
            handle.viewport = rect;
        }
        let Some(mut camera) = handle.parts.camera.and_then(|e| cameras.get_mut(e).ok()) else {
            continue;
        };
        let viewport = physical_viewport(rect, scale_factor);
        if !same_viewport(&camera.viewport, &viewport) {
            camera.viewport = viewport;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::markers::MarkerStyle;
    use bevy::ecs::system::RunSystemOnce;
    use constants::agents::{BIRD_COUNT, CUMULUS_COUNT, NIMBOSTRATUS_COUNT};

    fn catalog() -> AreaCatalog {
        AreaCatalog::from_json_str(include_str!("../../../assets/data/areas.json")).unwrap()
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_asset::<Image>()
            .add_event::<MapEvent>()
            .add_event::<ViewRequest>()
            .insert_resource(catalog())
            .insert_resource(TerrainShape::default())
            .insert_resource(EdgeFadeMask::new(64))
            .init_resource::<ViewLayout>()
            .init_resource::<ViewConfigs>()
            .add_systems(Update, apply_view_requests_system);
        app.world_mut().run_system_once(spawn_layout_views).unwrap();
        app.update();
        app
    }

    fn view_handle(app: &mut App, view: ViewId) -> Option<(Entity, SceneHandle)> {
        let world = app.world_mut();
        let mut query = world.query::<(Entity, &SceneHandle)>();
        query.iter(world).find(|(_, h)| h.view == view).map(|(e, h)| (e, h.clone()))
    }

    fn terrain_vertex_count(app: &App, handle: &SceneHandle) -> usize {
        let terrain = handle.parts.terrain.unwrap();
        let mesh = app.world().get::<Mesh3d>(terrain).unwrap();
        app.world().resource::<Assets<Mesh>>().get(&mesh.0).unwrap().count_vertices()
    }

    fn request(app: &mut App, request: ViewRequest) {
        app.world_mut().send_event(request);
        app.update();
    }

    #[test]
    fn builds_every_part_of_a_view() {
        let mut app = test_app();
        let (_, handle) = view_handle(&mut app, ViewId::Left).unwrap();
        let parts = &handle.parts;

        assert_eq!(parts.markers.len(), catalog().len());
        assert_eq!(parts.birds.len(), BIRD_COUNT);
        assert_eq!(parts.clouds.len(), CUMULUS_COUNT + NIMBOSTRATUS_COUNT);
        assert_eq!(parts.clouds.iter().filter(|c| c.shadow.is_some()).count(), CUMULUS_COUNT);
        assert_eq!(parts.overlay.len(), 2);
        assert_eq!(terrain_vertex_count(&app, &handle), 257 * 257);
        for entity in parts.root_entities() {
            assert!(app.world().get_entity(entity).is_ok());
        }
        assert!(view_handle(&mut app, ViewId::Right).is_none());
    }

    #[test]
    fn resolution_change_rebuilds_view() {
        let mut app = test_app();
        let (_, before) = view_handle(&mut app, ViewId::Left).unwrap();
        let old_terrain = before.parts.terrain.unwrap();
        let old_mesh = before.parts.meshes[0].id();

        let settings = ViewSettings {
            segments: 128,
            ..ViewSettings::default()
        };
        request(&mut app, ViewRequest::Settings { view: ViewId::Left, settings });

        let (_, after) = view_handle(&mut app, ViewId::Left).unwrap();
        assert_eq!(after.generation, before.generation + 1);
        assert!(app.world().get_entity(old_terrain).is_err());
        assert!(app.world().resource::<Assets<Mesh>>().get(old_mesh).is_none());
        assert_eq!(terrain_vertex_count(&app, &after), 129 * 129);
    }

    #[test]
    fn marker_style_change_rebuilds_view() {
        let mut app = test_app();
        let settings = ViewSettings {
            marker_style: MarkerStyle::Pin,
            ..ViewSettings::default()
        };
        request(&mut app, ViewRequest::Settings { view: ViewId::Left, settings });
        let (_, after) = view_handle(&mut app, ViewId::Left).unwrap();
        assert_eq!(after.generation, 1);
    }

    #[test]
    fn tweaks_update_in_place() {
        let mut app = test_app();
        let (_, before) = view_handle(&mut app, ViewId::Left).unwrap();

        let mut tweaks = ViewSettings::default().tweaks;
        tweaks.terrain_roughness = 0.25;
        tweaks.sun_intensity = 2.0;
        tweaks.fog_density = 0.5;
        request(&mut app, ViewRequest::Tweaks { view: ViewId::Left, tweaks });

        let (_, after) = view_handle(&mut app, ViewId::Left).unwrap();
        assert_eq!(after.generation, before.generation);
        assert_eq!(after.parts.terrain, before.parts.terrain);

        let material = after.parts.terrain_material.as_ref().unwrap();
        let material = app.world().resource::<Assets<StandardMaterial>>().get(material).unwrap();
        assert_eq!(material.perceptual_roughness, 0.25);

        let sun = app.world().get::<DirectionalLight>(after.parts.sun.unwrap()).unwrap();
        assert_eq!(sun.illuminance, directional_illuminance(2.0));

        let fog = app.world().get::<DistanceFog>(after.parts.camera.unwrap()).unwrap();
        assert!(matches!(fog.falloff, bevy::pbr::FogFalloff::ExponentialSquared { density } if density == 0.5));
    }

    #[test]
    fn marker_toggle_hides_without_moving() {
        let mut app = test_app();
        let settings = ViewSettings {
            segments: 128,
            ..ViewSettings::default()
        };
        request(&mut app, ViewRequest::Settings { view: ViewId::Left, settings: settings.clone() });

        let shape = TerrainShape::default();
        let centre = shape.height(0.0, 0.0);
        assert!(centre > 0.0 && centre <= shape.max_height());

        let (_, before) = view_handle(&mut app, ViewId::Left).unwrap();
        let marker = before.parts.markers[0].clone();
        let visual_transform = *app.world().get::<Transform>(marker.visual).unwrap();
        let stem_transform = *app.world().get::<Transform>(marker.stem).unwrap();

        for shown in [false, true] {
            request(
                &mut app,
                ViewRequest::Settings {
                    view: ViewId::Left,
                    settings: ViewSettings {
                        show_markers: shown,
                        ..settings.clone()
                    },
                },
            );

            let expected = if shown { Visibility::Inherited } else { Visibility::Hidden };
            let (_, after) = view_handle(&mut app, ViewId::Left).unwrap();
            assert_eq!(after.generation, before.generation);
            assert_eq!(after.parts.markers.len(), before.parts.markers.len());
            assert_eq!(after.parts.markers[0].visual, marker.visual);
            assert_eq!(after.parts.markers[0].stem, marker.stem);
            assert_eq!(after.parts.markers[0].glow, marker.glow);
            for entity in [marker.visual, marker.stem, marker.glow] {
                assert_eq!(app.world().get::<Visibility>(entity), Some(&expected));
            }
            assert_eq!(app.world().get::<Transform>(marker.visual), Some(&visual_transform));
            assert_eq!(app.world().get::<Transform>(marker.stem), Some(&stem_transform));
        }
    }

    #[test]
    fn split_view_spawns_and_removes_right_view() {
        let mut app = test_app();
        request(&mut app, ViewRequest::Split { enabled: true });
        let (_, right) = view_handle(&mut app, ViewId::Right).unwrap();
        assert_eq!(right.settings.segments, 512);
        let right_camera = right.parts.camera.unwrap();

        request(&mut app, ViewRequest::Split { enabled: false });
        assert!(view_handle(&mut app, ViewId::Right).is_none());
        assert!(app.world().get_entity(right_camera).is_err());
        assert!(view_handle(&mut app, ViewId::Left).is_some());
    }

    #[test]
    fn teardown_cancels_clock_and_releases_assets() {
        let mut app = test_app();
        let released = app
            .world_mut()
            .run_system_once(|mut assets: SceneAssets, mut handles: Query<&mut SceneHandle>| {
                let mut handle = handles.single_mut().unwrap();
                let meshes = handle.parts.meshes.clone();
                assets.teardown_view(&mut handle);
                let cancelled = !handle.clock.is_running();
                let gone = meshes.iter().all(|mesh| assets.meshes.get(mesh).is_none());
                cancelled && gone && handle.parts.root_entities().is_empty()
            })
            .unwrap();
        assert!(released);
    }
}
