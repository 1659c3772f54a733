//! Window-independent input handling
use std::collections::HashSet;

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::model::Movement;

/// Input the session understands, already stripped of windowing details
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A held movement key, applied for `elapsed` seconds
    Move { direction: Movement, elapsed: f32 },
    /// Absolute cursor position in window pixels
    PointerMoved { x: f32, y: f32 },
    /// Raw device motion, y already pointing up
    PointerDelta { dx: f32, dy: f32 },
    Scroll { delta: f32 },
    ToggleCapture,
}

/// What a key does when it goes down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Movement),
    ToggleCapture,
    Quit,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub toggle_capture: KeyCode,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            up: KeyCode::Space,
            down: KeyCode::ControlLeft,
            toggle_capture: KeyCode::AltLeft,
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    pub fn action(&self, code: KeyCode) -> Option<KeyAction> {
        let movement = [
            (self.forward, Movement::Forward),
            (self.backward, Movement::Backward),
            (self.left, Movement::Left),
            (self.right, Movement::Right),
            (self.up, Movement::Up),
            (self.down, Movement::Down),
        ];
        if let Some(&(_, direction)) = movement.iter().find(|(key, _)| *key == code) {
            return Some(KeyAction::Move(direction));
        }
        if code == self.toggle_capture {
            Some(KeyAction::ToggleCapture)
        } else if code == self.quit {
            Some(KeyAction::Quit)
        } else {
            None
        }
    }
}

/// Keys currently held down
#[derive(Debug, Default)]
pub struct HeldKeys {
    pressed: HashSet<KeyCode>,
}

impl HeldKeys {
    /// True only on the transition from up to down
    pub fn press(&mut self, code: KeyCode) -> bool {
        self.pressed.insert(code)
    }

    pub fn release(&mut self, code: KeyCode) {
        self.pressed.remove(&code);
    }

    /// Track a release from any source; presses are handled by `press`
    pub fn key_released(&mut self, state: ElementState, key: PhysicalKey) {
        if let (ElementState::Released, PhysicalKey::Code(code)) = (state, key) {
            self.release(code);
        }
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// One `Move` event per held movement key
    pub fn movement_events(&self, bindings: &KeyBindings, elapsed: f32) -> Vec<InputEvent> {
        let mut events: Vec<InputEvent> = self
            .pressed
            .iter()
            .filter_map(|&code| match bindings.action(code) {
                Some(KeyAction::Move(direction)) => Some(InputEvent::Move { direction, elapsed }),
                _ => None,
            })
            .collect();
        // HashSet order is arbitrary; keep frames reproducible
        events.sort_by_key(|e| match e {
            InputEvent::Move { direction, .. } => *direction as u8,
            _ => u8::MAX,
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action(KeyCode::KeyW), Some(KeyAction::Move(Movement::Forward)));
        assert_eq!(keys.action(KeyCode::ControlLeft), Some(KeyAction::Move(Movement::Down)));
        assert_eq!(keys.action(KeyCode::Space), Some(KeyAction::Move(Movement::Up)));
        assert_eq!(keys.action(KeyCode::AltLeft), Some(KeyAction::ToggleCapture));
        assert_eq!(keys.action(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(keys.action(KeyCode::KeyQ), None);
    }

    #[test]
    fn press_is_edge_triggered() {
        let mut held = HeldKeys::default();
        assert!(held.press(KeyCode::AltLeft));
        assert!(!held.press(KeyCode::AltLeft));
        assert!(held.is_pressed(KeyCode::AltLeft));
        held.release(KeyCode::AltLeft);
        assert!(held.press(KeyCode::AltLeft));
    }

    #[test]
    fn release_clears_held_key_and_ignores_presses() {
        let mut held = HeldKeys::default();
        held.press(KeyCode::KeyW);

        held.key_released(ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyW));
        assert!(held.is_pressed(KeyCode::KeyW));

        held.key_released(ElementState::Released, PhysicalKey::Code(KeyCode::KeyW));
        assert!(!held.is_pressed(KeyCode::KeyW));
        assert!(held.movement_events(&KeyBindings::default(), 1.0).is_empty());
    }

    #[test]
    fn held_keys_become_move_events() {
        let keys = KeyBindings::default();
        let mut held = HeldKeys::default();
        held.press(KeyCode::KeyD);
        held.press(KeyCode::KeyW);
        held.press(KeyCode::AltLeft);

        let events = held.movement_events(&keys, 0.5);
        assert_eq!(
            events,
            vec![
                InputEvent::Move { direction: Movement::Forward, elapsed: 0.5 },
                InputEvent::Move { direction: Movement::Right, elapsed: 0.5 },
            ]
        );

        held.clear();
        assert!(held.movement_events(&keys, 0.5).is_empty());
    }
}
