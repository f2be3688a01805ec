// irkbd uinput Output Layer
// Virtual keyboard re-injecting key actions on the local host

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, EventType, InputEvent};

use super::state::PressedKeyState;
use super::{HidEmitter, OutputError};
use crate::key::{linux_code, KEY_TABLE};
use crate::{Action, Combo, Key};

const DEVICE_NAME: &str = "irkbd (virtual) Keyboard";

/// Virtual uinput device for key output.
///
/// Modifiers go down before the combo's key and come up after it, one
/// evdev event per key followed by a SYN report.
pub struct VirtualDevice {
    device: evdev::uinput::VirtualDevice,
    pressed: PressedKeyState,
}

impl VirtualDevice {
    /// Create a new virtual uinput device able to send every known key
    pub fn new() -> Result<Self, OutputError> {
        let mut keys = AttributeSet::new();
        for &(_, _, code) in KEY_TABLE {
            keys.insert(evdev::Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .name(DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| OutputError::DeviceCreation(e.to_string()))?;

        log::info!("Created uinput device '{}'", DEVICE_NAME);

        Ok(Self {
            device,
            pressed: PressedKeyState::new(),
        })
    }

    /// Write a single key event to the virtual device
    fn write_key_event(&mut self, key: Key, action: Action) -> Result<(), OutputError> {
        let code = linux_code(key).ok_or(OutputError::Unsupported(key))?;
        let key_event = InputEvent::new(EventType::KEY, code, action.to_i32());
        // SYN event is required for the kernel to process the key event
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);

        log::trace!("uinput {} {} (code {})", action, key, code);
        self.device
            .emit(&[key_event, syn_event])
            .map_err(OutputError::Write)
    }

    /// Keys currently held on the virtual device
    pub fn pressed(&self) -> &PressedKeyState {
        &self.pressed
    }
}

impl HidEmitter for VirtualDevice {
    fn press(&mut self, combo: Combo) -> Result<(), OutputError> {
        for key in self.pressed.press_combo(combo) {
            self.write_key_event(key, Action::Down)?;
        }
        Ok(())
    }

    fn release(&mut self, combo: Combo) -> Result<(), OutputError> {
        for key in self.pressed.release_combo(combo) {
            self.write_key_event(key, Action::Up)?;
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        let held: Vec<Key> = self.pressed.keys().iter().rev().copied().collect();
        self.pressed.clear();
        for key in held {
            self.write_key_event(key, Action::Up)?;
        }
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if let Err(e) = HidEmitter::release_all(self) {
            log::warn!("Failed to release keys on uinput shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Modifiers;

    #[test]
    fn test_virtual_device_creation() {
        // Needs write access to /dev/uinput, unavailable in most CI containers
        match VirtualDevice::new() {
            Ok(mut device) => {
                let combo = Combo::new(Modifiers::CTRL, Key::DOWN);
                device.press(combo).unwrap();
                assert_eq!(device.pressed().keys(), &[Key::LEFT_CTRL, Key::DOWN]);
                device.release(combo).unwrap();
                assert!(device.pressed().is_empty());
            }
            Err(e) => assert!(matches!(e, OutputError::DeviceCreation(_))),
        }
    }

    #[test]
    fn test_every_key_has_linux_code() {
        for &(name, key, _) in KEY_TABLE {
            assert!(linux_code(key).is_some(), "{} has no evdev code", name);
        }
    }
}
