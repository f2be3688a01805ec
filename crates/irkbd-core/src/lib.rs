// irkbd Core Library
// Infrared remote to USB keyboard translation

pub mod action;
pub mod combo;
pub mod config;
pub mod event;
pub mod input;
pub mod key;
pub mod layout;
pub mod mapping;
pub mod modifier;
pub mod output;
pub mod transform;

pub use action::{Action, KeyAction};
pub use combo::Combo;
pub use config::{parse_combo_string, ComboParseError, Config, ConfigError, OutputBackend};
pub use event::{Relay, RelayError, RelayStats};
pub use input::{Clock, Decoder, DecoderError, IrCode, IrEvent, ManualClock, MonotonicClock, Timestamp};
pub use key::Key;
pub use layout::Layout;
pub use mapping::{Duplicate, KeyMapping, Keymap};
pub use modifier::{ModifierError, Modifiers};
pub use output::{HidEmitter, KeyboardReport, OutputError, ReportEmitter};
pub use transform::{EngineState, Timing, TranslationEngine};
