use bevy::prelude::*;

use super::settings::{SceneTweaks, ViewId, ViewSettings};
use crate::engine::assets::TextureStatus;
use crate::engine::camera::CameraState;

/// Outbound state changes of a view, forwarded to the page and to the split
/// view coordinator.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum MapEvent {
    CameraMoved {
        view: ViewId,
        state: CameraState,
    },
    HoverChanged {
        view: ViewId,
        area_id: Option<String>,
    },
    AreaSelected {
        view: ViewId,
        area_id: Option<String>,
    },
    TextureStatus {
        view: ViewId,
        path: String,
        status: TextureStatus,
    },
}

/// Inbound configuration for the views.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ViewRequest {
    Settings { view: ViewId, settings: ViewSettings },
    Tweaks { view: ViewId, tweaks: SceneTweaks },
    Split { enabled: bool },
    ClearSelection { view: ViewId },
}
