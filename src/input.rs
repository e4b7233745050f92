//! Window input, reduced to what the scene reacts to.
//!
//! Two things matter: the first user gesture (it starts deferred video
//! playback and asks for orientation permission), and on desktop the pointer
//! position, which stands in for device tilt.

use crate::orientation::{pointer_tilt, OrientationSample};
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// What an input event means for the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Click, tap, or Space/Enter.
    Interact,
    /// Pointer moved; emulated tilt for the new position.
    Tilt(OrientationSample),
    /// Escape pressed.
    Quit,
}

/// Tracks held keys and the window size between events.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    window_size: (u32, u32),
}

impl Input {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Translate a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<InputAction> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => self.key(code, event.state),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.pointer_moved(position.x, position.y))
            }
            WindowEvent::Touch(touch) => {
                self.touch(touch.phase, touch.location.x, touch.location.y)
            }
            _ => None,
        }
    }

    fn key(&mut self, code: KeyCode, state: ElementState) -> Option<InputAction> {
        match state {
            ElementState::Pressed => {
                // Ignore auto-repeat.
                if !self.keys_held.insert(code) {
                    return None;
                }
                match code {
                    KeyCode::Space | KeyCode::Enter => Some(InputAction::Interact),
                    KeyCode::Escape => Some(InputAction::Quit),
                    _ => None,
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&code);
                None
            }
        }
    }

    fn mouse_button(&self, button: MouseButton, state: ElementState) -> Option<InputAction> {
        let pressed = button == MouseButton::Left && state == ElementState::Pressed;
        pressed.then_some(InputAction::Interact)
    }

    fn pointer_moved(&self, x: f64, y: f64) -> InputAction {
        let (w, h) = self.window_size;
        InputAction::Tilt(pointer_tilt(x, y, w, h))
    }

    fn touch(&self, phase: TouchPhase, x: f64, y: f64) -> Option<InputAction> {
        match phase {
            TouchPhase::Started => Some(InputAction::Interact),
            TouchPhase::Moved => Some(self.pointer_moved(x, y)),
            TouchPhase::Ended | TouchPhase::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_interacts_once_per_press() {
        let mut input = Input::new(800, 600);
        assert_eq!(
            input.key(KeyCode::Space, ElementState::Pressed),
            Some(InputAction::Interact)
        );
        // Held key repeating.
        assert_eq!(input.key(KeyCode::Space, ElementState::Pressed), None);
        assert_eq!(input.key(KeyCode::Space, ElementState::Released), None);
        assert_eq!(
            input.key(KeyCode::Space, ElementState::Pressed),
            Some(InputAction::Interact)
        );
    }

    #[test]
    fn test_other_keys() {
        let mut input = Input::new(800, 600);
        assert_eq!(
            input.key(KeyCode::Escape, ElementState::Pressed),
            Some(InputAction::Quit)
        );
        assert_eq!(input.key(KeyCode::KeyA, ElementState::Pressed), None);
    }

    #[test]
    fn test_left_click_interacts() {
        let input = Input::new(800, 600);
        assert_eq!(
            input.mouse_button(MouseButton::Left, ElementState::Pressed),
            Some(InputAction::Interact)
        );
        assert_eq!(input.mouse_button(MouseButton::Left, ElementState::Released), None);
        assert_eq!(input.mouse_button(MouseButton::Right, ElementState::Pressed), None);
    }

    #[test]
    fn test_pointer_centre_is_level() {
        let input = Input::new(800, 600);
        match input.pointer_moved(400.0, 300.0) {
            InputAction::Tilt(sample) => {
                assert!(sample.beta.abs() < 1e-4);
                assert!(sample.gamma.abs() < 1e-4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pointer_uses_current_window_size() {
        let mut input = Input::new(800, 600);
        input.set_window_size(400, 300);
        let InputAction::Tilt(sample) = input.pointer_moved(400.0, 300.0) else {
            panic!("expected tilt");
        };
        assert!((sample.gamma - 90.0).abs() < 1e-4);
        assert!((sample.beta - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_touch() {
        let input = Input::new(800, 600);
        assert_eq!(
            input.touch(TouchPhase::Started, 10.0, 10.0),
            Some(InputAction::Interact)
        );
        let moved = input.touch(TouchPhase::Moved, 20.0, 20.0);
        assert!(matches!(moved, Some(InputAction::Tilt(_))));
        assert_eq!(input.touch(TouchPhase::Ended, 20.0, 20.0), None);
    }
}
