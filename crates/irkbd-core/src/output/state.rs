// irkbd Pressed Key State Management
// Ordered set of keys currently held on the output side

use smallvec::SmallVec;

use crate::{Combo, Key};

/// Tracks pressed keys in press order.
///
/// Modifier keys (Left Ctrl etc.) are tracked like any other key; the
/// report builder splits them out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeyState {
    pressed: SmallVec<[Key; 8]>,
}

impl PressedKeyState {
    /// Create a new empty pressed key state
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key. Returns false if it was already pressed.
    pub fn add(&mut self, key: Key) -> bool {
        if self.is_pressed(key) {
            return false;
        }
        self.pressed.push(key);
        true
    }

    /// Remove a key. Returns false if it was not pressed.
    pub fn remove(&mut self, key: Key) -> bool {
        match self.pressed.iter().position(|k| *k == key) {
            Some(index) => {
                self.pressed.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check if a key is currently pressed
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Press a combo's modifiers, then its key. Returns the keys that went
    /// down, in order.
    pub fn press_combo(&mut self, combo: Combo) -> SmallVec<[Key; 5]> {
        combo
            .modifiers()
            .keys()
            .chain(std::iter::once(combo.key()))
            .filter(|key| self.add(*key))
            .collect()
    }

    /// Release a combo's key, then its modifiers in reverse. Returns the
    /// keys that went up, in order.
    pub fn release_combo(&mut self, combo: Combo) -> SmallVec<[Key; 5]> {
        let modifiers: SmallVec<[Key; 4]> = combo.modifiers().keys().collect();
        std::iter::once(combo.key())
            .chain(modifiers.into_iter().rev())
            .filter(|key| self.remove(*key))
            .collect()
    }

    /// Pressed keys in press order
    pub fn keys(&self) -> &[Key] {
        &self.pressed
    }

    /// Clear all pressed keys
    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    /// Get the number of pressed keys
    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    /// Check if the state is empty
    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Modifiers;

    #[test]
    fn test_state_add_remove() {
        let mut state = PressedKeyState::new();

        assert!(!state.is_pressed(Key::A));
        assert!(state.add(Key::A));
        assert!(state.is_pressed(Key::A));
        assert!(state.remove(Key::A));
        assert!(!state.is_pressed(Key::A));
    }

    #[test]
    fn test_state_duplicate_add() {
        let mut state = PressedKeyState::new();

        assert!(state.add(Key::A));
        assert!(!state.add(Key::A));

        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_state_remove_nonexistent() {
        let mut state = PressedKeyState::new();
        assert!(!state.remove(Key::A));
        assert!(state.is_empty());
    }

    #[test]
    fn test_press_combo_order() {
        let mut state = PressedKeyState::new();
        let combo = Combo::new(Modifiers::CTRL | Modifiers::SHIFT, Key::A);

        let down = state.press_combo(combo);
        assert_eq!(down.as_slice(), &[Key::LEFT_CTRL, Key::LEFT_SHIFT, Key::A]);
        assert!(state.press_combo(combo).is_empty());

        let up = state.release_combo(combo);
        assert_eq!(up.as_slice(), &[Key::A, Key::LEFT_SHIFT, Key::LEFT_CTRL]);
        assert!(state.release_combo(combo).is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_press_order_keeps_modifier_first() {
        let mut state = PressedKeyState::new();
        state.press_combo(Combo::new(Modifiers::GUI, Key::E));
        assert_eq!(state.keys(), &[Key::LEFT_META, Key::E]);
    }

    #[test]
    fn test_state_clear() {
        let mut state = PressedKeyState::new();
        state.add(Key::A);
        state.add(Key::B);

        assert_eq!(state.len(), 2);
        state.clear();
        assert!(state.is_empty());
    }
}
