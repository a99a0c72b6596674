//! Keyboard state and camera key bindings.

use std::collections::HashSet;

pub use minifb::Key;
use softscene_scene::{CameraInput, InputSource};

/// Which keys drive which camera control.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    bindings: Vec<(CameraInput, Key)>,
}

impl Default for KeyBindings {
    /// WASD pans, Q/E zoom out/in, arrows rotate, R resets.
    fn default() -> Self {
        Self {
            bindings: vec![
                (CameraInput::MoveUp, Key::W),
                (CameraInput::MoveDown, Key::S),
                (CameraInput::MoveLeft, Key::A),
                (CameraInput::MoveRight, Key::D),
                (CameraInput::ZoomOut, Key::Q),
                (CameraInput::ZoomIn, Key::E),
                (CameraInput::RotateUp, Key::Up),
                (CameraInput::RotateDown, Key::Down),
                (CameraInput::RotateLeft, Key::Left),
                (CameraInput::RotateRight, Key::Right),
                (CameraInput::Reset, Key::R),
            ],
        }
    }
}

impl KeyBindings {
    /// Bindings with nothing bound.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a key for a control. A control may have several keys.
    pub fn bind(&mut self, input: CameraInput, key: Key) {
        if !self.bindings.contains(&(input, key)) {
            self.bindings.push((input, key));
        }
    }

    /// Remove every key bound to a control.
    pub fn unbind(&mut self, input: CameraInput) {
        self.bindings.retain(|(bound, _)| *bound != input);
    }

    /// Keys bound to a control.
    pub fn keys(&self, input: CameraInput) -> impl Iterator<Item = Key> + '_ {
        self.bindings
            .iter()
            .filter(move |(bound, _)| *bound == input)
            .map(|(_, key)| *key)
    }
}

/// Tracks the current state of the keyboard.
#[derive(Debug, Default)]
pub struct InputState {
    /// Currently pressed keys
    pressed_keys: HashSet<Key>,
    /// Keys that were just pressed this frame
    just_pressed_keys: HashSet<Key>,
    /// Keys that were just released this frame
    just_released_keys: HashSet<Key>,
    bindings: KeyBindings,
}

impl InputState {
    /// Create a new input state with the default bindings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Call at the beginning of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed_keys.clear();
        self.just_released_keys.clear();
    }

    /// Replace the pressed set with the keys held right now.
    ///
    /// Starts a new frame and records what changed since the last call.
    pub fn sync(&mut self, held: &[Key]) {
        self.begin_frame();
        let held: HashSet<Key> = held.iter().copied().collect();
        let released: Vec<Key> = self.pressed_keys.difference(&held).copied().collect();
        for key in released {
            self.on_key_released(key);
        }
        for key in held {
            self.on_key_pressed(key);
        }
    }

    /// Handle a key press event.
    pub fn on_key_pressed(&mut self, key: Key) {
        if self.pressed_keys.insert(key) {
            self.just_pressed_keys.insert(key);
        }
    }

    /// Handle a key release event.
    pub fn on_key_released(&mut self, key: Key) {
        if self.pressed_keys.remove(&key) {
            self.just_released_keys.insert(key);
        }
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Check if a key was just pressed this frame.
    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// Check if a key was just released this frame.
    pub fn is_key_just_released(&self, key: Key) -> bool {
        self.just_released_keys.contains(&key)
    }
}

impl InputSource for InputState {
    fn is_active(&self, input: CameraInput) -> bool {
        self.bindings.keys(input).any(|key| self.is_key_pressed(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_cover_every_control() {
        let bindings = KeyBindings::default();
        for input in CameraInput::ALL {
            assert!(bindings.keys(input).next().is_some(), "{input:?} unbound");
        }
    }

    #[test]
    fn test_sync_tracks_edges() {
        let mut state = InputState::new();
        state.sync(&[Key::W, Key::Left]);
        assert!(state.is_key_pressed(Key::W));
        assert!(state.is_key_just_pressed(Key::W));

        state.sync(&[Key::W]);
        assert!(state.is_key_pressed(Key::W));
        assert!(!state.is_key_just_pressed(Key::W));
        assert!(state.is_key_just_released(Key::Left));
        assert!(!state.is_key_pressed(Key::Left));

        state.sync(&[]);
        assert!(!state.is_key_pressed(Key::W));
        assert!(state.is_key_just_released(Key::W));
    }

    #[test]
    fn test_bound_keys_activate_controls() {
        let mut state = InputState::new();
        state.sync(&[Key::W, Key::Q, Key::R]);
        assert!(state.is_active(CameraInput::MoveUp));
        assert!(state.is_active(CameraInput::ZoomOut));
        assert!(state.is_active(CameraInput::Reset));
        assert!(!state.is_active(CameraInput::MoveDown));
        assert!(!state.is_active(CameraInput::RotateLeft));
    }

    #[test]
    fn test_rebinding() {
        let mut state = InputState::with_bindings(KeyBindings::empty());
        state.bindings_mut().bind(CameraInput::ZoomIn, Key::Equal);
        state.bindings_mut().bind(CameraInput::ZoomIn, Key::NumPadPlus);
        state.sync(&[Key::NumPadPlus]);
        assert!(state.is_active(CameraInput::ZoomIn));

        state.bindings_mut().unbind(CameraInput::ZoomIn);
        assert!(!state.is_active(CameraInput::ZoomIn));
    }
}
