// irkbd Config - Combo String Parser
// Parses combo strings like "Ctrl-Shift-A" into structured components

use crate::key::key_from_name;
use crate::{Key, Modifiers};

/// Result of parsing a combo string
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCombo {
    /// The modifiers parsed from the string
    pub modifiers: Modifiers,
    /// The key (the last component after hyphens)
    pub key: Key,
}

/// Errors that can occur during combo parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComboParseError {
    /// Empty input string
    #[error("combo string cannot be empty")]
    EmptyInput,
    /// Key name not recognized
    #[error("unknown key name: '{0}'")]
    UnknownKey(String),
    /// Modifier alias not recognized
    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),
    /// Input ends with hyphen (e.g., "Ctrl-")
    #[error("combo string cannot end with hyphen")]
    TrailingHyphen,
}

/// Parse a combo string like "Ctrl-Shift-A" into modifiers and key
///
/// # Examples
/// ```
/// use irkbd_core::config::parse_combo_string;
/// use irkbd_core::{Key, Modifiers};
/// let parsed = parse_combo_string("Ctrl-2").unwrap();
/// assert_eq!(parsed.modifiers, Modifiers::CTRL);
/// assert_eq!(parsed.key, Key::KEY_2);
/// ```
pub fn parse_combo_string(exp: &str) -> Result<ParsedCombo, ComboParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(ComboParseError::EmptyInput);
    }

    if trimmed.ends_with('-') {
        return Err(ComboParseError::TrailingHyphen);
    }

    let mut parts: Vec<&str> = trimmed.split('-').collect();

    // The last part is always the key
    let key_str = parts.pop().ok_or(ComboParseError::EmptyInput)?;
    let key =
        key_from_name(key_str).ok_or_else(|| ComboParseError::UnknownKey(key_str.to_string()))?;

    // Everything before it is a modifier; repeats are harmless
    let mut modifiers = Modifiers::empty();
    for modifier_str in parts {
        let modifier = Modifiers::from_alias(modifier_str)
            .ok_or_else(|| ComboParseError::UnknownModifier(modifier_str.to_string()))?;
        modifiers |= modifier;
    }

    Ok(ParsedCombo { modifiers, key })
}
