//! Bridges winit's event stream to [`InputEvent`]s.

use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::engine::input::InputEvent;

/// Key codes are named after winit's `KeyCode` variants (`"KeyW"`,
/// `"ShiftLeft"`, `"Space"`). Auto-repeat presses are dropped.
pub fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    let WindowEvent::KeyboardInput { event, .. } = event else {
        return None;
    };
    if event.repeat {
        return None;
    }
    let code = match event.physical_key {
        PhysicalKey::Code(code) => format!("{code:?}"),
        PhysicalKey::Unidentified(_) => return None,
    };
    Some(match event.state {
        ElementState::Pressed => InputEvent::KeyDown(code),
        ElementState::Released => InputEvent::KeyUp(code),
    })
}

/// Raw pointer motion, unaffected by cursor acceleration or window bounds.
pub fn translate_device_event(event: &DeviceEvent) -> Option<InputEvent> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::MouseMove {
            dx: *dx as f32,
            dy: *dy as f32,
        }),
        _ => None,
    }
}
