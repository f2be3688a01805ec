// irkbd Mapping Structures
// KeyMapping, Keymap

use std::fmt;

use indexmap::IndexMap;

use crate::input::IrCode;
use crate::Combo;

/// One row of a keymap table: remote button to key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyMapping {
    pub code: IrCode,
    pub combo: Combo,
}

impl KeyMapping {
    pub fn new(code: u32, combo: impl Into<Combo>) -> Self {
        Self {
            code: IrCode(code),
            combo: combo.into(),
        }
    }
}

impl fmt::Display for KeyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.code, self.combo)
    }
}

/// A later table row whose code was already claimed by an earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duplicate {
    /// Position of the shadowed row in the original table
    pub index: usize,
    pub code: IrCode,
    pub kept: Combo,
    pub ignored: Combo,
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code {} at entry {} maps to {}, already mapped to {}",
            self.code, self.index, self.ignored, self.kept
        )
    }
}

/// Code-to-combo table with first-match-wins lookup.
///
/// Rows are kept in table order. A code appearing more than once resolves
/// to its first row; the shadowed rows are recorded as [`Duplicate`]s.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    name: String,
    mappings: IndexMap<IrCode, KeyMapping>,
    duplicates: Vec<Duplicate>,
}

impl Keymap {
    /// Create an empty Keymap
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mappings: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Build a keymap from rows in priority order, logging shadowed rows
    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = KeyMapping>,
    ) -> Self {
        let mut keymap = Self::new(name);
        for entry in entries {
            keymap.insert(entry);
        }
        for dup in &keymap.duplicates {
            log::warn!("[{}] {}; first entry wins", keymap.name, dup);
        }
        keymap
    }

    /// Build a keymap that refuses duplicate codes
    pub fn from_entries_strict(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = KeyMapping>,
    ) -> Result<Self, Duplicate> {
        let mut keymap = Self::new(name);
        for entry in entries {
            keymap.insert(entry);
            if let Some(dup) = keymap.duplicates.first() {
                return Err(*dup);
            }
        }
        Ok(keymap)
    }

    /// Append the rows of a lower-priority table. Rows whose code is
    /// already mapped are recorded as duplicates and logged at debug.
    pub fn extend_fallback(&mut self, entries: impl IntoIterator<Item = KeyMapping>) {
        for entry in entries {
            if !self.insert(entry) {
                log::debug!("[{}] {} shadowed by an earlier entry", self.name, entry);
            }
        }
    }

    /// Append a row. Returns false if the code was already mapped.
    pub fn insert(&mut self, entry: KeyMapping) -> bool {
        let index = self.mappings.len() + self.duplicates.len();
        match self.mappings.get(&entry.code) {
            Some(existing) => {
                self.duplicates.push(Duplicate {
                    index,
                    code: entry.code,
                    kept: existing.combo,
                    ignored: entry.combo,
                });
                false
            }
            None => {
                self.mappings.insert(entry.code, entry);
                true
            }
        }
    }

    /// Get the name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First row for `code`, if any
    pub fn lookup(&self, code: IrCode) -> Option<&KeyMapping> {
        self.mappings.get(&code)
    }

    /// Check if a code is mapped
    pub fn contains(&self, code: IrCode) -> bool {
        self.mappings.contains_key(&code)
    }

    /// Effective rows in table order
    pub fn entries(&self) -> impl Iterator<Item = &KeyMapping> + '_ {
        self.mappings.values()
    }

    /// Rows that lost to an earlier row with the same code
    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    /// Number of effective rows
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Key, Modifiers};

    #[test]
    fn test_keymap_lookup() {
        let keymap = Keymap::from_entries(
            "test",
            [
                KeyMapping::new(0x800f1422, Key::ENTER),
                KeyMapping::new(0x800f1402, Combo::new(Modifiers::CTRL, Key::KEY_2)),
            ],
        );

        assert_eq!(keymap.len(), 2);
        assert_eq!(
            keymap.lookup(IrCode(0x800f1422)).map(|m| m.combo),
            Some(Combo::plain(Key::ENTER))
        );
        assert_eq!(
            keymap.lookup(IrCode(0x800f1402)).map(|m| m.combo),
            Some(Combo::new(Modifiers::CTRL, Key::KEY_2))
        );
        assert!(keymap.lookup(IrCode(0x1234)).is_none());
        assert!(!keymap.contains(IrCode(0x1234)));
    }

    #[test]
    fn test_first_match_wins() {
        let keymap = Keymap::from_entries(
            "dup",
            [
                KeyMapping::new(0x17, Key::B),
                KeyMapping::new(0x18, Key::SPACE),
                KeyMapping::new(0x17, Key::SYSRQ),
            ],
        );

        assert_eq!(keymap.lookup(IrCode(0x17)).map(|m| m.combo.key()), Some(Key::B));
        assert_eq!(keymap.len(), 2);
        assert_eq!(
            keymap.duplicates(),
            &[Duplicate {
                index: 2,
                code: IrCode(0x17),
                kept: Key::B.into(),
                ignored: Key::SYSRQ.into(),
            }]
        );
    }

    #[test]
    fn test_strict_rejects_duplicates() {
        let err = Keymap::from_entries_strict(
            "dup",
            [KeyMapping::new(0x1, Key::A), KeyMapping::new(0x1, Key::B)],
        )
        .unwrap_err();
        assert_eq!(err.code, IrCode(0x1));
        assert_eq!(err.index, 1);

        let ok = Keymap::from_entries_strict("ok", [KeyMapping::new(0x1, Key::A)]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_fallback_rows_never_override() {
        let mut keymap = Keymap::from_entries("custom", [KeyMapping::new(0x22, Key::SPACE)]);
        keymap.extend_fallback([
            KeyMapping::new(0x22, Key::ENTER),
            KeyMapping::new(0x1e, Key::UP),
            KeyMapping::new(0x1e, Key::W),
        ]);

        assert_eq!(keymap.len(), 2);
        assert_eq!(keymap.lookup(IrCode(0x22)).map(|m| m.combo), Some(Key::SPACE.into()));
        assert_eq!(keymap.lookup(IrCode(0x1e)).map(|m| m.combo), Some(Key::UP.into()));
        let shadowed: Vec<usize> = keymap.duplicates().iter().map(|d| d.index).collect();
        assert_eq!(shadowed, vec![1, 3]);
    }

    #[test]
    fn test_entries_keep_table_order() {
        let keymap = Keymap::from_entries(
            "order",
            [
                KeyMapping::new(3, Key::C),
                KeyMapping::new(1, Key::A),
                KeyMapping::new(2, Key::B),
            ],
        );
        let codes: Vec<u32> = keymap.entries().map(|m| m.code.0).collect();
        assert_eq!(codes, vec![3, 1, 2]);
    }

    #[test]
    fn test_mapping_display() {
        let mapping = KeyMapping::new(0x800f1402, Combo::new(Modifiers::CTRL, Key::KEY_2));
        assert_eq!(mapping.to_string(), "0x800f1402 -> Ctrl-KEY_2");
    }
}
