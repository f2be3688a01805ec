// irkbd Output Layer
// Key emission: USB HID reports or a uinput virtual keyboard

mod hidg;
mod report;
mod state;

#[cfg(feature = "linux")]
mod uinput;

pub use hidg::{GadgetSink, ReportEmitter, ReportSink};
pub use report::{KeyboardReport, ERROR_ROLL_OVER, KEY_SLOTS, REPORT_LEN};
pub use state::PressedKeyState;

#[cfg(feature = "linux")]
pub use uinput::VirtualDevice;

use crate::{Action, Combo, Key, KeyAction};

/// Error types for output operations
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to open {0}: {1}")]
    Open(String, #[source] std::io::Error),

    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write: {0}")]
    Write(#[source] std::io::Error),

    #[error("No evdev code for key {0}")]
    Unsupported(Key),
}

/// Sink for the key actions produced by the translation engine.
///
/// Implementations must make redundant presses and releases harmless.
pub trait HidEmitter {
    fn press(&mut self, combo: Combo) -> Result<(), OutputError>;

    fn release(&mut self, combo: Combo) -> Result<(), OutputError>;

    /// Release everything this emitter holds down
    fn release_all(&mut self) -> Result<(), OutputError>;

    fn apply(&mut self, action: KeyAction) -> Result<(), OutputError> {
        match action.action {
            Action::Down => self.press(action.combo),
            Action::Up => self.release(action.combo),
        }
    }
}

/// Recording emitter: keeps every action it is given, in order
impl HidEmitter for Vec<KeyAction> {
    fn press(&mut self, combo: Combo) -> Result<(), OutputError> {
        self.push(KeyAction::down(combo));
        Ok(())
    }

    fn release(&mut self, combo: Combo) -> Result<(), OutputError> {
        self.push(KeyAction::up(combo));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

impl<E: HidEmitter + ?Sized> HidEmitter for Box<E> {
    fn press(&mut self, combo: Combo) -> Result<(), OutputError> {
        (**self).press(combo)
    }

    fn release(&mut self, combo: Combo) -> Result<(), OutputError> {
        (**self).release(combo)
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        (**self).release_all()
    }
}
