// irkbd Modifier System
// Keyboard modifier mask (Ctrl, Alt, Shift, GUI) combined with a base key

use std::fmt;

use bitflags::bitflags;

use crate::Key;

bitflags! {
    /// Modifier keys held together with a mapped key.
    ///
    /// Bit values are the ones keymap tables have always used; they are
    /// not the HID modifier byte layout, see [`Modifiers::hid_byte`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 1;
        const ALT = 2;
        const SHIFT = 4;
        const GUI = 8;
    }
}

/// Errors that can occur when parsing modifiers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModifierError {
    #[error("unknown modifier '{0}'")]
    UnknownAlias(String),

    #[error("modifier mask {0:#04x} has bits outside Ctrl/Alt/Shift/GUI")]
    InvalidMask(u8),
}

/// Accepted spellings for each modifier, primary alias first
const ALIASES: &[(Modifiers, &[&str])] = &[
    (Modifiers::CTRL, &["Ctrl", "C", "Control", "LCtrl"]),
    (Modifiers::ALT, &["Alt", "A", "Opt", "Option", "LAlt"]),
    (Modifiers::SHIFT, &["Shift", "S", "LShift"]),
    (
        Modifiers::GUI,
        &["GUI", "Super", "Win", "Meta", "Cmd", "Command", "LSuper"],
    ),
];

impl Modifiers {
    /// Build a mask from its raw bits, rejecting unknown bits
    pub fn from_mask(mask: u8) -> Result<Self, ModifierError> {
        Self::from_bits(mask).ok_or(ModifierError::InvalidMask(mask))
    }

    /// Resolve a single modifier alias such as "Ctrl" or "Win"
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim();
        ALIASES
            .iter()
            .find(|(_, names)| names.iter().any(|n| n.eq_ignore_ascii_case(alias)))
            .map(|(modifier, _)| *modifier)
    }

    /// HID boot report modifier byte.
    ///
    /// Combos are always sent with the left-hand modifier keys:
    /// bit 0 Left Ctrl, bit 1 Left Shift, bit 2 Left Alt, bit 3 Left GUI.
    pub fn hid_byte(self) -> u8 {
        let mut byte = 0;
        if self.contains(Modifiers::CTRL) {
            byte |= 0x01;
        }
        if self.contains(Modifiers::SHIFT) {
            byte |= 0x02;
        }
        if self.contains(Modifiers::ALT) {
            byte |= 0x04;
        }
        if self.contains(Modifiers::GUI) {
            byte |= 0x08;
        }
        byte
    }

    /// The physical modifier keys to hold, in press order
    pub fn keys(self) -> impl Iterator<Item = Key> {
        [
            (Modifiers::CTRL, Key::LEFT_CTRL),
            (Modifiers::ALT, Key::LEFT_ALT),
            (Modifiers::SHIFT, Key::LEFT_SHIFT),
            (Modifiers::GUI, Key::LEFT_META),
        ]
        .into_iter()
        .filter(move |(modifier, _)| self.contains(*modifier))
        .map(|(_, key)| key)
    }

    fn primary_alias(self) -> &'static str {
        ALIASES
            .iter()
            .find(|(modifier, _)| *modifier == self)
            .map(|(_, names)| names[0])
            .unwrap_or("?")
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for modifier in self.iter() {
            if !first {
                write!(f, "-")?;
            }
            write!(f, "{}", modifier.primary_alias())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_from_alias() {
        assert_eq!(Modifiers::from_alias("Ctrl"), Some(Modifiers::CTRL));
        assert_eq!(Modifiers::from_alias("ctrl"), Some(Modifiers::CTRL));
        assert_eq!(Modifiers::from_alias("Win"), Some(Modifiers::GUI));
        assert_eq!(Modifiers::from_alias("Opt"), Some(Modifiers::ALT));
        assert_eq!(Modifiers::from_alias("Hyper"), None);
    }

    #[test]
    fn test_from_mask() {
        assert_eq!(Modifiers::from_mask(0), Ok(Modifiers::empty()));
        assert_eq!(Modifiers::from_mask(1), Ok(Modifiers::CTRL));
        assert_eq!(
            Modifiers::from_mask(1 | 4),
            Ok(Modifiers::CTRL | Modifiers::SHIFT)
        );
        assert_eq!(
            Modifiers::from_mask(0x10),
            Err(ModifierError::InvalidMask(0x10))
        );
    }

    #[test]
    fn test_hid_byte() {
        assert_eq!(Modifiers::empty().hid_byte(), 0);
        assert_eq!(Modifiers::CTRL.hid_byte(), 0x01);
        assert_eq!(Modifiers::SHIFT.hid_byte(), 0x02);
        assert_eq!(Modifiers::ALT.hid_byte(), 0x04);
        assert_eq!(Modifiers::GUI.hid_byte(), 0x08);
        assert_eq!(Modifiers::all().hid_byte(), 0x0f);
    }

    #[test]
    fn test_modifier_keys_order() {
        let keys: Vec<Key> = (Modifiers::SHIFT | Modifiers::CTRL).keys().collect();
        assert_eq!(keys, vec![Key::LEFT_CTRL, Key::LEFT_SHIFT]);
        assert_eq!(Modifiers::empty().keys().count(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Modifiers::CTRL.to_string(), "Ctrl");
        assert_eq!((Modifiers::CTRL | Modifiers::SHIFT).to_string(), "Ctrl-Shift");
        assert_eq!(Modifiers::empty().to_string(), "");
    }
}
