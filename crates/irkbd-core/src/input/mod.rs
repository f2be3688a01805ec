// irkbd Input Layer
// Decoded IR events and the decoders that produce them

mod event;
#[cfg(feature = "linux")]
mod lirc;
mod script;

pub use event::{
    Clock, Decoder, DecoderError, IrCode, IrEvent, ManualClock, MonotonicClock, Timestamp,
};
#[cfg(feature = "linux")]
pub use lirc::{
    LircDecoder, LircScancode, RepeatTracker, LIRC_SCANCODE_FLAG_REPEAT, LIRC_SCANCODE_FLAG_TOGGLE,
};
pub use script::ScriptDecoder;
