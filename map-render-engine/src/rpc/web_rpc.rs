use crate::engine::scene::MapEvent;
use crate::rpc::handlers::{
    RpcContext, handle_clear_selection, handle_get_areas, handle_get_camera_state, handle_get_fps,
    handle_set_scene_tweaks, handle_set_split_view, handle_set_view_settings, map_event_notification,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    forward_map_events,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut context: RpcContext,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Notifications (no id) are still applied but never answered.
fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    if request.jsonrpc != "2.0" {
        return request
            .id
            .clone()
            .map(|id| create_error_response(id, -32600, "Invalid request", None));
    }

    let result = match request.method.as_str() {
        "set_view_settings" => handle_set_view_settings(&request.params, context),
        "set_scene_tweaks" => handle_set_scene_tweaks(&request.params, context),
        "set_split_view" => handle_set_split_view(&request.params, context),
        "clear_selection" => handle_clear_selection(&request.params, context),
        "get_camera_state" => handle_get_camera_state(&request.params, context),
        "get_areas" => handle_get_areas(context),
        "get_fps" => handle_get_fps(context),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return request.id.clone().map(|id| {
                create_error_response(
                    id,
                    -32601,
                    "Method not found",
                    Some(serde_json::json!({"method": request.method})),
                )
            });
        }
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

// Pushes view events to the page
fn forward_map_events(mut events: EventReader<MapEvent>, mut rpc_interface: ResMut<WebRpcInterface>) {
    for event in events.read() {
        let (method, params) = map_event_notification(event);
        rpc_interface.send_notification(method, params);
    }
}

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AreaCatalog;
    use crate::engine::scene::markers::MarkerStyle;
    use crate::engine::scene::{SceneTweaks, ViewConfigs, ViewId, ViewRequest};
    use bevy::diagnostic::DiagnosticsStore;

    #[derive(Resource, Default)]
    struct Captured(Vec<RpcResponse>, Vec<ViewRequest>);

    fn capture(mut rpc: ResMut<WebRpcInterface>, mut requests: EventReader<ViewRequest>, mut captured: ResMut<Captured>) {
        captured.0.extend(rpc.outgoing_responses.drain(..));
        captured.1.extend(requests.read().cloned());
    }

    fn rpc_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<DiagnosticsStore>()
            .init_resource::<WebRpcInterface>()
            .init_resource::<ViewConfigs>()
            .init_resource::<Captured>()
            .insert_resource(AreaCatalog::from_json_str(include_str!("../../assets/data/areas.json")).unwrap())
            .add_event::<IncomingRpcMessage>()
            .add_event::<ViewRequest>()
            .add_systems(Update, (handle_rpc_messages, capture).chain());
        app
    }

    fn call(app: &mut App, body: serde_json::Value) -> RpcResponse {
        app.world_mut().send_event(IncomingRpcMessage {
            content: body.to_string(),
        });
        app.update();
        app.world_mut().resource_mut::<Captured>().0.pop().unwrap()
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut app = rpc_app();
        let response = call(&mut app, serde_json::json!({"jsonrpc": "2.0", "method": "nope", "id": 1}));
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[test]
    fn unknown_view_is_invalid_params() {
        let mut app = rpc_app();
        let response = call(
            &mut app,
            serde_json::json!({"jsonrpc": "2.0", "method": "clear_selection", "params": {"view": "centre"}, "id": 2}),
        );
        assert_eq!(response.error.unwrap().code, -32602);
        assert!(app.world().resource::<Captured>().1.is_empty());
    }

    #[test]
    fn unsupported_resolution_is_invalid_params() {
        let mut app = rpc_app();
        let response = call(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "set_view_settings",
                "params": {"view": "left", "settings": {"segments": 300}},
                "id": 3
            }),
        );
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn partial_settings_merge_onto_current() {
        let mut app = rpc_app();
        let response = call(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "set_view_settings",
                "params": {"view": "right", "settings": {"wireframe": true, "marker_style": "pin", "tweaks": {"fog_density": 2.0}}},
                "id": 4
            }),
        );
        assert!(response.error.is_none());

        let captured = &app.world().resource::<Captured>().1;
        let ViewRequest::Settings { view, settings } = &captured[0] else {
            panic!("expected a settings request");
        };
        assert_eq!(*view, ViewId::Right);
        assert!(settings.wireframe);
        assert_eq!(settings.marker_style, MarkerStyle::Pin);
        assert_eq!(settings.segments, 512);
        assert_eq!(settings.tweaks.fog_density, 2.0);
        assert_eq!(settings.tweaks.sun_intensity, SceneTweaks::default().sun_intensity);
    }

    #[test]
    fn get_areas_lists_catalog() {
        let mut app = rpc_app();
        let response = call(&mut app, serde_json::json!({"jsonrpc": "2.0", "method": "get_areas", "id": 5}));
        let areas = response.result.unwrap()["areas"].as_array().unwrap().len();
        assert_eq!(areas, app.world().resource::<AreaCatalog>().len());
    }

    #[test]
    fn camera_state_of_missing_view_is_rejected() {
        let mut app = rpc_app();
        let response = call(
            &mut app,
            serde_json::json!({"jsonrpc": "2.0", "method": "get_camera_state", "params": {"view": "left"}, "id": 6}),
        );
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[test]
    fn remote_map_is_invalid_params() {
        let mut app = rpc_app();
        let response = call(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "set_view_settings",
                "params": {"view": "left", "settings": {"map": "http://tiles.example.org/map.jpg"}},
                "id": 7
            }),
        );
        assert_eq!(response.error.unwrap().code, -32602);
        assert!(app.world().resource::<Captured>().1.is_empty());
        assert_eq!(app.world().resource::<ViewConfigs>().left.map, "textures/map.jpg");
    }

    #[test]
    fn patches_in_one_frame_accumulate() {
        let mut app = rpc_app();
        for body in [
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "set_scene_tweaks",
                "params": {"view": "left", "tweaks": {"fog_density": 3.0}},
                "id": 8
            }),
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "set_view_settings",
                "params": {"view": "left", "settings": {"show_birds": false}},
                "id": 9
            }),
        ] {
            app.world_mut().send_event(IncomingRpcMessage {
                content: body.to_string(),
            });
        }
        app.update();

        let captured = app.world().resource::<Captured>();
        assert_eq!(captured.0.len(), 2);
        assert!(captured.0.iter().all(|response| response.error.is_none()));
        let Some(ViewRequest::Settings { settings, .. }) = captured.1.last() else {
            panic!("expected a settings request last");
        };
        assert_eq!(settings.tweaks.fog_density, 3.0);
        assert!(!settings.show_birds);

        let left = &app.world().resource::<ViewConfigs>().left;
        assert_eq!(left.tweaks.fog_density, 3.0);
        assert!(!left.show_birds);
    }
}
