// irkbd Input Layer - Scripted decoder
// Replays a recorded sequence of IR events against a clock

use std::collections::VecDeque;
use std::time::Duration;

use super::event::{Clock, Decoder, DecoderError, IrCode, IrEvent};

/// Decoder that hands out pre-recorded events once the clock reaches them.
///
/// Script format, one event per line, `#` starts a comment:
///
/// ```text
/// # offset_ms  code        [repeat]
/// 0            0x800f1422
/// 114          0x800f1422  repeat
/// ```
///
/// Offsets are relative to the clock reading when the script is loaded.
pub struct ScriptDecoder<C: Clock> {
    clock: C,
    pending: VecDeque<IrEvent>,
    paced: bool,
}

impl<C: Clock> ScriptDecoder<C> {
    /// Create a decoder from events with absolute timestamps
    pub fn new(clock: C, events: impl IntoIterator<Item = IrEvent>) -> Self {
        Self {
            clock,
            pending: events.into_iter().collect(),
            paced: false,
        }
    }

    /// Parse a replay script, anchoring offsets at the current clock reading
    pub fn from_script(clock: C, script: &str) -> Result<Self, DecoderError> {
        let origin = clock.now();
        let mut events = Vec::new();

        for (line_no, line) in script.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let script_error = move |message: String| DecoderError::Script {
                line: line_no + 1,
                message,
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 2 || fields.len() > 3 {
                return Err(script_error(format!(
                    "expected '<offset_ms> <code> [repeat]', got '{}'",
                    line
                )));
            }
            let offset: u32 = fields[0]
                .parse()
                .map_err(|_| script_error(format!("invalid offset '{}'", fields[0])))?;
            let code: IrCode = fields[1].parse().map_err(script_error)?;
            let repeat = match fields.get(2) {
                None => false,
                Some(flag) if flag.eq_ignore_ascii_case("repeat") => true,
                Some(flag) => return Err(script_error(format!("unknown flag '{}'", flag))),
            };

            events.push(IrEvent {
                code,
                repeat,
                timestamp: origin.add_millis(offset),
            });
        }

        Ok(Self::new(clock, events))
    }

    /// Sleep for the poll timeout when nothing is due, like a real device
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Events not yet delivered
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn pop_due(&mut self) -> Option<IrEvent> {
        let now = self.clock.now();
        let front = self.pending.front()?;
        // Due when it is not in the future (within half the counter range)
        if now.millis_since(front.timestamp) < u32::MAX / 2 {
            self.pending.pop_front()
        } else {
            None
        }
    }
}

impl<C: Clock> Decoder for ScriptDecoder<C> {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<IrEvent>, DecoderError> {
        if let Some(event) = self.pop_due() {
            return Ok(Some(event));
        }
        if self.paced {
            std::thread::sleep(timeout);
            return Ok(self.pop_due());
        }
        Ok(None)
    }
}
