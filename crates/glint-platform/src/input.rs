//! Keyboard input state.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks which keys are held and which were pressed this frame.
#[derive(Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit keyboard event into the state.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.press(code),
            ElementState::Released => self.release(code),
        }
    }

    pub fn press(&mut self, code: KeyCode) {
        if self.pressed.insert(code) {
            self.just_pressed.insert(code);
        }
    }

    pub fn release(&mut self, code: KeyCode) {
        self.pressed.remove(&code);
    }

    #[inline]
    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    #[inline]
    pub fn just_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&code)
    }

    /// Clear per-frame state. Call once at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_both_states() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        assert!(input.is_pressed(KeyCode::KeyW));
        assert!(input.just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn held_key_is_not_just_pressed_next_frame() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        input.begin_frame();
        assert!(input.is_pressed(KeyCode::KeyW));
        assert!(!input.just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn key_repeat_does_not_retrigger_just_pressed() {
        let mut input = InputState::new();
        input.press(KeyCode::Space);
        input.begin_frame();
        input.press(KeyCode::Space);
        assert!(!input.just_pressed(KeyCode::Space));
    }

    #[test]
    fn release_clears_pressed() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyA);
        input.release(KeyCode::KeyA);
        assert!(!input.is_pressed(KeyCode::KeyA));
    }
}
