use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::animation::sync::{
    advance_views_system, sync_marker_overlays_system, sync_view_transforms_system,
};
use crate::engine::assets::AreaCatalog;
use crate::engine::core::app_state::{
    AppState, DatasetLoader, load_dataset_system, notify_engine_ready, start_loading,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::scene::lifecycle::{
    apply_view_requests_system, poll_map_textures_system, spawn_layout_views,
    update_viewports_system,
};
use crate::engine::scene::{MapEvent, ViewConfigs, ViewLayout, ViewRequest};
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::terrain::{EdgeFadeMask, TerrainShape};
// Crate tools modules
use crate::tools::camera_sync::{
    SplitViewCoordinator, mirror_camera_system, sync_coordinator_with_layout,
};
use crate::tools::interaction::pointer_input_system;
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::app_state::FpsText;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::fps_text_update_system;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the areas dataset as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<AreaCatalog>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(WireframePlugin::default())
        .insert_resource(WireframeConfig {
            global: false,
            default_color: Color::WHITE,
        });

    // Initialise resources early
    app.init_resource::<DatasetLoader>()
        .init_resource::<AreaCatalog>()
        .init_resource::<TerrainShape>()
        .init_resource::<EdgeFadeMask>()
        .init_resource::<ViewLayout>()
        .init_resource::<ViewConfigs>()
        .init_resource::<SplitViewCoordinator>()
        .insert_resource(ClearColor(Color::BLACK))
        .add_event::<MapEvent>()
        .add_event::<ViewRequest>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            load_dataset_system.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            OnEnter(AppState::Running),
            (spawn_layout_views, notify_engine_ready).chain(),
        );

    // Per-frame order: layout, page requests, input, mirroring, animation, then transforms.
    let runtime_systems = (
        update_viewports_system,
        apply_view_requests_system,
        sync_coordinator_with_layout,
        pointer_input_system,
        mirror_camera_system,
        advance_views_system,
        poll_map_textures_system,
        sync_view_transforms_system,
        sync_marker_overlays_system,
        fps_notification_system,
    )
        .chain();

    // Add fps_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system);
    }

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    app
}

// Startup system that only handles basic initialisation
#[cfg_attr(target_arch = "wasm32", allow(unused_mut, unused_variables))]
fn setup(mut commands: Commands) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            GlobalZIndex(10),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
