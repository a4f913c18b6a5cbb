use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::render_settings::AREAS_PATH;

use crate::engine::assets::AreaCatalog;
use crate::engine::scene::{SceneHandle, ViewLayout};
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

/// Pending load of the areas dataset.
#[derive(Resource, Default)]
pub struct DatasetLoader {
    pub handle: Option<Handle<AreaCatalog>>,
}

pub fn start_loading(mut loader: ResMut<DatasetLoader>, asset_server: Res<AssetServer>) {
    info!("Loading areas from: {}", AREAS_PATH);
    loader.handle = Some(asset_server.load(AREAS_PATH));
}

/// Install the dataset once it resolves and move on to Running.
///
/// A missing or invalid dataset is not fatal: the views are built without
/// markers.
pub fn load_dataset_system(
    mut commands: Commands,
    loader: Res<DatasetLoader>,
    asset_server: Res<AssetServer>,
    catalogs: Res<Assets<AreaCatalog>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    if let Some(catalog) = catalogs.get(handle) {
        match catalog.validate() {
            Ok(()) => {
                info!("Loaded {} areas", catalog.len());
                commands.insert_resource(catalog.clone());
            }
            Err(e) => {
                error!("Rejected areas dataset: {}", e);
                commands.insert_resource(AreaCatalog::default());
            }
        }
        next_state.set(AppState::Running);
        return;
    }

    if let LoadState::Failed(e) = asset_server.load_state(handle) {
        error!("Failed to load areas dataset: {}", e);
        commands.insert_resource(AreaCatalog::default());
        next_state.set(AppState::Running);
    }
}

// Tells the page which views are up
pub fn notify_engine_ready(
    mut rpc_interface: ResMut<WebRpcInterface>,
    layout: Res<ViewLayout>,
    handles: Query<&SceneHandle>,
) {
    info!("Map engine running with {} view(s)", handles.iter().count());
    rpc_interface.send_notification(
        "engine_ready",
        serde_json::json!({
            "views": layout.views()
        }),
    );
}
