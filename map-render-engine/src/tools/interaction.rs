//! Pointer and wheel handling for the map views.
//!
//! The handlers operate on a single [`SceneHandle`] and report what changed;
//! [`pointer_input_system`] routes window input to the view under the cursor
//! and turns those reports into [`MapEvent`]s.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::{CursorLeft, PrimaryWindow};
use constants::camera::DRAG_THRESHOLD_PX;

use super::picking::pick_marker;
use crate::engine::assets::AreaCatalog;
use crate::engine::camera::{CameraState, cursor_to_ndc};
use crate::engine::scene::{MapEvent, SceneHandle};

/// Drag bookkeeping and the last pointer position of a view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub dragging: bool,
    /// Set once a drag travels past the click threshold.
    pub moved: bool,
    pub last: Option<Vec2>,
    /// Pointer in normalised device coordinates, None until it enters the view.
    pub ndc: Option<Vec2>,
    pub inside: bool,
}

pub fn pointer_down(handle: &mut SceneHandle, cursor: Vec2) {
    handle.pointer.dragging = true;
    handle.pointer.moved = false;
    handle.pointer.last = Some(cursor);
}

/// Track the pointer and pan while dragging. Returns the new camera state
/// when the camera moved.
pub fn pointer_move(handle: &mut SceneHandle, cursor: Vec2) -> Option<CameraState> {
    handle.pointer.inside = true;
    handle.pointer.ndc = cursor_to_ndc(cursor, handle.viewport);

    if !handle.pointer.dragging {
        return None;
    }
    let last = handle.pointer.last.replace(cursor)?;
    let delta = cursor - last;
    if delta.x.abs() > DRAG_THRESHOLD_PX || delta.y.abs() > DRAG_THRESHOLD_PX {
        handle.pointer.moved = true;
    }
    let viewport = handle.viewport_size();
    handle.camera.pan(delta, viewport).then(|| handle.camera.state())
}

/// End a drag. A release without movement selects the marker under the
/// pointer; when nothing is hit the selection is left as it was.
pub fn pointer_up(handle: &mut SceneHandle) -> Option<usize> {
    let was_click = handle.pointer.dragging && !handle.pointer.moved;
    handle.pointer.dragging = false;
    if !was_click {
        return None;
    }
    let picked = pick_marker(handle)?;
    handle.selected = Some(picked);
    Some(picked)
}

pub fn pointer_leave(handle: &mut SceneHandle) {
    handle.pointer.dragging = false;
    handle.pointer.inside = false;
}

/// One wheel notch. Positive `delta_y` zooms out.
pub fn wheel(handle: &mut SceneHandle, delta_y: f32) -> Option<CameraState> {
    handle.camera.zoom(delta_y).then(|| handle.camera.state())
}

// Routes window pointer input to the view whose viewport contains the cursor
pub fn pointer_input_system(
    mut handles: Query<&mut SceneHandle>,
    mut cursor_moved: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    mut wheel_events: EventReader<MouseWheel>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    catalog: Res<AreaCatalog>,
    mut map_events: EventWriter<MapEvent>,
) {
    for ev in cursor_moved.read() {
        let cursor = ev.position;
        for mut handle in &mut handles {
            if handle.viewport.contains(cursor) {
                if let Some(state) = pointer_move(&mut handle, cursor) {
                    map_events.write(MapEvent::CameraMoved { view: handle.view, state });
                }
            } else if handle.pointer.inside {
                pointer_leave(&mut handle);
            }
        }
    }

    if cursor_left.read().count() > 0 {
        for mut handle in &mut handles {
            pointer_leave(&mut handle);
        }
    }

    let cursor = windows.single().ok().and_then(|window| window.cursor_position());

    if let Some(cursor) = cursor {
        if buttons.just_pressed(MouseButton::Left) {
            for mut handle in &mut handles {
                if handle.viewport.contains(cursor) {
                    pointer_down(&mut handle, cursor);
                }
            }
        }
    }

    if buttons.just_released(MouseButton::Left) {
        for mut handle in &mut handles {
            if let Some(marker) = pointer_up(&mut handle) {
                let area_id = handle.area_id(&catalog, Some(marker)).map(str::to_owned);
                info!("{} view selected area {:?}", handle.view.as_str(), area_id);
                map_events.write(MapEvent::AreaSelected { view: handle.view, area_id });
            }
        }
    }

    for ev in wheel_events.read() {
        let Some(cursor) = cursor else {
            continue;
        };
        for mut handle in &mut handles {
            if handle.viewport.contains(cursor) {
                if let Some(state) = wheel(&mut handle, -ev.y) {
                    map_events.write(MapEvent::CameraMoved { view: handle.view, state });
                }
            }
        }
    }
}
