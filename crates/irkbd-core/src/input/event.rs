// irkbd Input Layer - Decoded IR events
// Command codes, wraparound-safe timestamps, and the decoder seam

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Opaque protocol-specific command code identifying a remote button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct IrCode(pub u32);

impl From<u32> for IrCode {
    fn from(code: u32) -> Self {
        IrCode(code)
    }
}

impl fmt::Display for IrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl FromStr for IrCode {
    type Err = String;

    /// Accepts `0x`-prefixed hex or plain decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
            None => s.replace('_', "").parse::<u32>(),
        };
        parsed
            .map(IrCode)
            .map_err(|_| format!("invalid IR code: '{}'", s))
    }
}

/// Reading of a free-running millisecond counter.
///
/// The counter wraps every ~49.7 days; only differences between two
/// readings are meaningful and they are computed with wrapping arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(pub u32);

impl Timestamp {
    /// Milliseconds from `earlier` to `self`, robust to counter wraparound
    pub fn millis_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Advance by a number of milliseconds, wrapping
    pub fn add_millis(self, ms: u32) -> Self {
        Timestamp(self.0.wrapping_add(ms))
    }
}

/// One decoded remote transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrEvent {
    /// Which button
    pub code: IrCode,
    /// Protocol-level "still held" repeat rather than a fresh press
    pub repeat: bool,
    /// When the transmission was received
    pub timestamp: Timestamp,
}

impl IrEvent {
    pub fn press(code: u32, timestamp: Timestamp) -> Self {
        Self {
            code: IrCode(code),
            repeat: false,
            timestamp,
        }
    }

    pub fn repeat(code: u32, timestamp: Timestamp) -> Self {
        Self {
            code: IrCode(code),
            repeat: true,
            timestamp,
        }
    }
}

impl fmt::Display for IrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} @{}ms",
            self.code,
            if self.repeat { " (repeat)" } else { "" },
            self.timestamp.0
        )
    }
}

/// Source of monotonic time for the polling cycle
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Host clock counting milliseconds since construction.
///
/// Copies share the same origin, so a decoder and the relay holding
/// copies of one clock produce comparable timestamps.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        // Truncation is the wraparound
        Timestamp(self.origin.elapsed().as_millis() as u32)
    }
}

/// Clock advanced by hand, for driving the engine deterministically
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Errors that can occur while reading decoded IR
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a lirc device")]
    NotLirc(String),

    #[error("{0} cannot report decoded scancodes")]
    NoScancodeSupport(String),

    #[error("replay script line {line}: {message}")]
    Script { line: usize, message: String },
}

/// Produces decoded IR events.
///
/// Implementations must return within roughly `timeout` so the caller can
/// keep checking the hold timeout while the remote is silent.
/// Malformed or partial decodes are reported as `Ok(None)`.
pub trait Decoder {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<IrEvent>, DecoderError>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<IrEvent>, DecoderError> {
        (**self).next_event(timeout)
    }
}
