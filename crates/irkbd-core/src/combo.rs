// irkbd Combo Type
// A base key together with the modifiers held while it is pressed

use std::fmt;
use std::str::FromStr;

use crate::config::combo_parser::{parse_combo_string, ComboParseError};
use crate::{Key, Modifiers};

/// Represents a key combination such as `Ctrl-Down`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combo {
    modifiers: Modifiers,
    key: Key,
}

impl Combo {
    /// Create a new Combo from modifiers and a key
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// A key pressed without modifiers
    pub fn plain(key: Key) -> Self {
        Self::new(Modifiers::empty(), key)
    }

    /// Get the modifiers for this combo
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Get the key for this combo
    pub fn key(&self) -> Key {
        self.key
    }
}

impl From<Key> for Combo {
    fn from(key: Key) -> Self {
        Combo::plain(key)
    }
}

impl FromStr for Combo {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parse_combo_string(s)?;
        Ok(Combo::new(parsed.modifiers, parsed.key))
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}-{}", self.modifiers, self.key)
        }
    }
}
