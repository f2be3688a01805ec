// irkbd Key Type
// A single keyboard key, identified by its USB HID usage id

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

/// Alternate spellings accepted in keymap files.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("RETURN", "ENTER"),
    ("ESCAPE", "ESC"),
    ("PERIOD", "DOT"),
    ("QUOTE", "APOSTROPHE"),
    ("PRINTSCREEN", "SYSRQ"),
    ("PRINT", "SYSRQ"),
    ("PAGEUP", "PAGE_UP"),
    ("PAGEDOWN", "PAGE_DOWN"),
    ("PGUP", "PAGE_UP"),
    ("PGDN", "PAGE_DOWN"),
    ("DEL", "DELETE"),
    ("INS", "INSERT"),
    ("MENU", "COMPOSE"),
    ("VOLUME_MUTE", "MUTE"),
    ("VOLUME_UP", "VOLUMEUP"),
    ("VOLUME_DOWN", "VOLUMEDOWN"),
    ("LEFT_ARROW", "LEFT"),
    ("RIGHT_ARROW", "RIGHT"),
    ("UP_ARROW", "UP"),
    ("DOWN_ARROW", "DOWN"),
];

fn names() -> &'static HashMap<&'static str, Key> {
    static KEY_NAMES: OnceLock<HashMap<&'static str, Key>> = OnceLock::new();
    KEY_NAMES.get_or_init(|| {
        let mut names: HashMap<&'static str, Key> =
            KEY_TABLE.iter().map(|&(name, key, _)| (name, key)).collect();
        for &(alias, target) in KEY_ALIASES {
            if let Some(&key) = names.get(target) {
                names.insert(alias, key);
            }
        }
        names
    })
}

/// Display name for a key
pub fn key_name(key: Key) -> &'static str {
    KEY_TABLE
        .iter()
        .find(|(_, k, _)| *k == key)
        .map(|(name, _, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Look up a key by name.
///
/// Names are case-insensitive. A bare digit ("2") resolves to the digit
/// row key, and the `KEY_` prefix is optional.
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let names = names();
    if let Some(&key) = names.get(upper.as_str()) {
        return Some(key);
    }
    if let Some(stripped) = upper.strip_prefix("KEY_") {
        if let Some(&key) = names.get(stripped) {
            return Some(key);
        }
    }
    names.get(format!("KEY_{}", upper).as_str()).copied()
}

/// Linux input-event-codes.h code for a key, used by the uinput backend
pub fn linux_code(key: Key) -> Option<u16> {
    KEY_TABLE
        .iter()
        .find(|(_, k, _)| *k == key)
        .map(|&(_, _, code)| code)
}

/// Check whether a key lives in the HID modifier range (0xE0..=0xE7)
pub const fn is_modifier_usage(key: Key) -> bool {
    key.0 >= 0xe0 && key.0 <= 0xe7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_constants_match_hid_usages() {
        assert_eq!(Key::A.code(), 0x04);
        assert_eq!(Key::ENTER.code(), 0x28);
        assert_eq!(Key::KEY_2.code(), 0x1f);
        assert_eq!(Key::VOLUMEUP.code(), 0x80);
    }

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("enter"), Some(Key::ENTER));
        assert_eq!(key_from_name("Return"), Some(Key::ENTER));
        assert_eq!(key_from_name("2"), Some(Key::KEY_2));
        assert_eq!(key_from_name("KEY_A"), Some(Key::A));
        assert_eq!(key_from_name("page_up"), Some(Key::PAGE_UP));
        assert_eq!(key_from_name("PrintScreen"), Some(Key::SYSRQ));
        assert_eq!(key_from_name("nope"), None);
        assert_eq!(key_from_name(""), None);
    }

    #[test]
    fn test_key_display_and_parse() {
        assert_eq!(Key::ESC.to_string(), "ESC");
        assert_eq!("quote".parse::<Key>(), Ok(Key::APOSTROPHE));
        assert!("bogus".parse::<Key>().is_err());
        assert_eq!(Key::from(0x00e9).name(), "UNKNOWN");
    }

    #[test]
    fn test_linux_codes() {
        assert_eq!(linux_code(Key::A), Some(30));
        assert_eq!(linux_code(Key::ENTER), Some(28));
        assert_eq!(linux_code(Key::LEFT_CTRL), Some(29));
        assert_eq!(linux_code(Key::from(0x00e9)), None);
    }

    #[test]
    fn test_is_modifier_usage() {
        assert!(is_modifier_usage(Key::LEFT_CTRL));
        assert!(is_modifier_usage(Key::RIGHT_META));
        assert!(!is_modifier_usage(Key::A));
    }
}
