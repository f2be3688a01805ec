use std::fmt;

use crate::Combo;

/// Direction of an emitted key transition.
///
/// Numeric values follow the evdev key event convention:
///   0 == 'released'
///   1 == 'pressed'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Up = 0,
    Down = 1,
}

impl Action {
    /// Convert Action to its evdev value
    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Up => write!(f, "Up"),
            Action::Down => write!(f, "Down"),
        }
    }
}

/// An instruction for the HID emitter: press or release one combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyAction {
    pub action: Action,
    pub combo: Combo,
}

impl KeyAction {
    pub fn down(combo: Combo) -> Self {
        Self {
            action: Action::Down,
            combo,
        }
    }

    pub fn up(combo: Combo) -> Self {
        Self {
            action: Action::Up,
            combo,
        }
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.action, self.combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Key, Modifiers};

    #[test]
    fn test_action_to_i32() {
        assert_eq!(Action::Up.to_i32(), 0);
        assert_eq!(Action::Down.to_i32(), 1);
    }

    #[test]
    fn test_key_action_display() {
        let combo = Combo::new(Modifiers::CTRL, Key::KEY_2);
        assert_eq!(KeyAction::down(combo).to_string(), "Down(Ctrl-KEY_2)");
        assert_eq!(KeyAction::up(Key::ENTER.into()).to_string(), "Up(ENTER)");
    }
}
