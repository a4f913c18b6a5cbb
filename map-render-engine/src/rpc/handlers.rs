use crate::engine::assets::{AreaCatalog, validate_map_path};
use crate::engine::scene::{MapEvent, SceneHandle, SceneTweaks, ViewConfigs, ViewId, ViewRequest, ViewSettings};
use crate::rpc::web_rpc::RpcError;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// World access needed to answer map requests.
///
/// `configs` holds the latest accepted settings per view. Handlers write to it
/// as soon as a request is accepted, so the next request in the same frame
/// merges onto it rather than onto what the scene currently shows.
#[derive(SystemParam)]
pub(super) struct RpcContext<'w, 's> {
    diagnostics: Res<'w, DiagnosticsStore>,
    catalog: Option<Res<'w, AreaCatalog>>,
    configs: ResMut<'w, ViewConfigs>,
    handles: Query<'w, 's, &'static SceneHandle>,
    view_requests: EventWriter<'w, ViewRequest>,
}

#[derive(serde::Deserialize)]
struct ViewParams {
    view: ViewId,
}

fn parse_view(params: &serde_json::Value) -> Result<ViewId, RpcError> {
    serde_json::from_value::<ViewParams>(params.clone())
        .map(|p| p.view)
        .map_err(|_| RpcError::invalid_params("Expected 'view' to be \"left\" or \"right\""))
}

/// Overlay the fields present in `patch` onto `current`.
///
/// Nested objects merge one level deep so a partial `tweaks` keeps the
/// untouched sliders.
fn merge_json(current: &mut serde_json::Value, patch: &serde_json::Value) {
    let (Some(target), Some(patch)) = (current.as_object_mut(), patch.as_object()) else {
        return;
    };
    for (key, value) in patch {
        let nested = value.is_object() && target.get(key).is_some_and(serde_json::Value::is_object);
        if nested {
            if let Some(existing) = target.get_mut(key) {
                merge_json(existing, value);
            }
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn merge_settings(current: &ViewSettings, patch: &serde_json::Value) -> Result<ViewSettings, RpcError> {
    if !patch.is_object() {
        return Err(RpcError::invalid_params("Expected 'settings' object"));
    }
    let mut merged = serde_json::to_value(current)
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise settings: {e}")))?;
    merge_json(&mut merged, patch);
    let settings = serde_json::from_value::<ViewSettings>(merged)
        .map_err(|e| RpcError::invalid_params(&format!("Invalid settings: {e}")))?;

    if !ViewSettings::segments_supported(settings.segments) {
        return Err(RpcError::invalid_params(&format!(
            "Unsupported resolution: {}",
            settings.segments
        )));
    }
    validate_map_path(&settings.map).map_err(|e| RpcError::invalid_params(&e.to_string()))?;
    Ok(settings)
}

pub(super) fn handle_set_view_settings(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let view = parse_view(params)?;
    let patch = params.get("settings").cloned().unwrap_or_default();
    let settings = merge_settings(context.configs.get(view), &patch)?;

    info!("Settings update for {} view", view.as_str());
    let applied = serde_json::to_value(&settings).unwrap_or_default();
    context.configs.set(view, settings.clone());
    context.view_requests.write(ViewRequest::Settings { view, settings });

    Ok(serde_json::json!({
        "success": true,
        "view": view,
        "settings": applied
    }))
}

pub(super) fn handle_set_scene_tweaks(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let view = parse_view(params)?;
    let patch = params.get("tweaks").cloned().unwrap_or_default();
    let settings = merge_settings(context.configs.get(view), &serde_json::json!({ "tweaks": patch }))?;
    let tweaks: SceneTweaks = settings.tweaks;

    context.configs.set(view, settings);
    context.view_requests.write(ViewRequest::Tweaks { view, tweaks });

    Ok(serde_json::json!({
        "success": true,
        "view": view,
        "tweaks": tweaks
    }))
}

pub(super) fn handle_set_split_view(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SplitParams {
        enabled: bool,
    }

    let split = serde_json::from_value::<SplitParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'enabled' parameter"))?;

    context.view_requests.write(ViewRequest::Split {
        enabled: split.enabled,
    });

    Ok(serde_json::json!({
        "success": true,
        "enabled": split.enabled
    }))
}

pub(super) fn handle_clear_selection(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let view = parse_view(params)?;
    context.view_requests.write(ViewRequest::ClearSelection { view });
    Ok(serde_json::json!({ "success": true, "view": view }))
}

pub(super) fn handle_get_camera_state(
    params: &serde_json::Value,
    context: &RpcContext,
) -> Result<serde_json::Value, RpcError> {
    let view = parse_view(params)?;
    let handle = context
        .handles
        .iter()
        .find(|handle| handle.view == view && handle.clock.is_running())
        .ok_or_else(|| RpcError::invalid_params(&format!("View '{}' is not active", view.as_str())))?;

    let state = handle.camera.state();
    Ok(serde_json::json!({
        "view": view,
        "x": state.x,
        "y": state.y,
        "z": state.z
    }))
}

pub(super) fn handle_get_areas(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let Some(catalog) = context.catalog.as_ref() else {
        return Ok(serde_json::json!({ "areas": [] }));
    };
    let areas = serde_json::to_value(&catalog.areas)
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialise areas: {e}")))?;
    Ok(serde_json::json!({ "areas": areas }))
}

/// Handle FPS retrieval with diagnostic system integration.
pub(super) fn handle_get_fps(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let fps = context
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Notification method and payload for a view event.
pub fn map_event_notification(event: &MapEvent) -> (&'static str, serde_json::Value) {
    match event {
        MapEvent::CameraMoved { view, state } => (
            "camera_moved",
            serde_json::json!({ "view": view, "x": state.x, "y": state.y, "z": state.z }),
        ),
        MapEvent::HoverChanged { view, area_id } => {
            ("hover_changed", serde_json::json!({ "view": view, "area_id": area_id }))
        }
        MapEvent::AreaSelected { view, area_id } => {
            ("area_selected", serde_json::json!({ "view": view, "area_id": area_id }))
        }
        MapEvent::TextureStatus { view, path, status } => (
            "map_texture_status",
            serde_json::json!({ "view": view, "path": path, "status": status }),
        ),
    }
}
