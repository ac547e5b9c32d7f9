use std::collections::HashMap;

use winit::event::{
    DeviceEvent, ElementState, Event, KeyboardInput, MouseScrollDelta, VirtualKeyCode, WindowEvent,
};

#[derive(Default, Debug)]
struct MouseState {
    delta_x: f32,
    delta_y: f32,
    scroll_y: f32,
}

/// Accumulates window and device events between frames.
///
/// Mouse motion and scroll are summed until [`InputSystem::reset`] is called;
/// the event loop is expected to call it once per frame, after the consumers
/// have read the accumulated deltas.
#[derive(Default, Debug)]
pub struct InputSystem {
    focused: bool,

    keyboard: HashMap<VirtualKeyCode, ElementState>,
    mouse: MouseState,
}

impl InputSystem {
    pub fn new() -> Self {
        Default::default()
    }

    /// Clears the per-frame accumulators. Key states persist until released.
    pub fn reset(&mut self) {
        self.mouse = MouseState::default();
    }

    pub fn on_event(&mut self, event: &Event<()>) {
        // handle focus state early
        if let Event::WindowEvent {
            event: WindowEvent::Focused(f),
            ..
        } = event
        {
            self.focused = *f;
            // when losing focus, reset states
            if !f {
                self.keyboard.clear();
                self.mouse = MouseState::default();
            }
            return;
        }

        // bail out if we are not focused
        if !self.focused {
            return;
        }

        #[allow(clippy::single_match)]
        #[allow(clippy::collapsible_match)]
        match event {
            Event::WindowEvent { ref event, .. } => match *event {
                // handle keys
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state,
                            virtual_keycode,
                            ..
                        },
                    ..
                } => {
                    if let Some(keycode) = virtual_keycode {
                        self.key_event(keycode, state);
                    }
                }
                _ => {}
            },
            Event::DeviceEvent { ref event, .. } => match *event {
                // raw motion, unaffected by cursor grab or pointer acceleration
                DeviceEvent::MouseMotion {
                    delta: (delta_x, delta_y),
                } => self.mouse_moved(delta_x as f32, delta_y as f32),
                // only the vertical line delta is of interest
                DeviceEvent::MouseWheel {
                    delta: MouseScrollDelta::LineDelta(_, delta_y),
                } => self.scrolled(delta_y),
                _ => {}
            },
            _ => {}
        }
    }

    pub fn key_event(&mut self, key: VirtualKeyCode, state: ElementState) {
        self.keyboard.insert(key, state);
    }

    pub fn mouse_moved(&mut self, delta_x: f32, delta_y: f32) {
        self.mouse.delta_x += delta_x;
        self.mouse.delta_y += delta_y;
    }

    pub fn scrolled(&mut self, delta_y: f32) {
        self.mouse.scroll_y += delta_y;
    }

    pub fn is_key_pressed(&self, key: VirtualKeyCode) -> bool {
        match self.keyboard.get(&key) {
            Some(state) => state == &ElementState::Pressed,
            None => false,
        }
    }

    pub fn is_key_released(&self, key: VirtualKeyCode) -> bool {
        match self.keyboard.get(&key) {
            Some(state) => state == &ElementState::Released,
            None => true,
        }
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        (self.mouse.delta_x, self.mouse.delta_y)
    }

    pub fn mouse_scroll_y(&self) -> f32 {
        self.mouse.scroll_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_state_tracks_last_event() {
        let mut input = InputSystem::new();
        assert!(!input.is_key_pressed(VirtualKeyCode::W));
        assert!(input.is_key_released(VirtualKeyCode::W));

        input.key_event(VirtualKeyCode::W, ElementState::Pressed);
        assert!(input.is_key_pressed(VirtualKeyCode::W));

        input.key_event(VirtualKeyCode::W, ElementState::Released);
        assert!(input.is_key_released(VirtualKeyCode::W));
    }

    #[test]
    fn mouse_motion_accumulates_until_reset() {
        let mut input = InputSystem::new();
        input.mouse_moved(2.0, -1.0);
        input.mouse_moved(3.0, 4.0);
        assert_eq!(input.mouse_delta(), (5.0, 3.0));

        input.reset();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn scroll_accumulates_until_reset() {
        let mut input = InputSystem::new();
        input.scrolled(1.0);
        input.scrolled(0.5);
        assert_eq!(input.mouse_scroll_y(), 1.5);

        input.reset();
        assert_eq!(input.mouse_scroll_y(), 0.0);
    }

    #[test]
    fn reset_keeps_held_keys() {
        let mut input = InputSystem::new();
        input.key_event(VirtualKeyCode::A, ElementState::Pressed);
        input.reset();
        assert!(input.is_key_pressed(VirtualKeyCode::A));
    }
}
