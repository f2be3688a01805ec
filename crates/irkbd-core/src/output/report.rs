// irkbd HID Boot Keyboard Report
// The 8-byte input report understood by every USB host without a driver

use std::fmt;

use super::state::PressedKeyState;
use crate::key::is_modifier_usage;

/// Length of a boot protocol keyboard input report
pub const REPORT_LEN: usize = 8;

/// Key slots in a boot report
pub const KEY_SLOTS: usize = 6;

/// Usage reported in every slot when more keys are held than fit
pub const ERROR_ROLL_OVER: u8 = 0x01;

/// Boot keyboard input report: modifier byte, reserved byte, six keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub keys: [u8; KEY_SLOTS],
}

impl KeyboardReport {
    /// The all-released report
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            keys: [0; KEY_SLOTS],
        }
    }

    /// Build the report for a pressed key set
    pub fn from_state(state: &PressedKeyState) -> Self {
        let mut report = Self::empty();
        let mut slot = 0;

        for key in state.keys() {
            if is_modifier_usage(*key) {
                report.modifiers |= 1u8 << (key.code() - 0xe0);
                continue;
            }
            if slot == KEY_SLOTS {
                report.keys = [ERROR_ROLL_OVER; KEY_SLOTS];
                break;
            }
            // Keyboard page usages used here all fit a byte
            report.keys[slot] = key.code() as u8;
            slot += 1;
        }

        report
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut bytes = [0u8; REPORT_LEN];
        bytes[0] = self.modifiers;
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }
}

impl fmt::Display for KeyboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.to_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
