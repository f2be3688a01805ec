// irkbd Relay
// Polling cycle wiring a decoder, the translation engine and an emitter

use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::{Clock, Decoder, DecoderError};
use crate::output::{HidEmitter, OutputError};
use crate::transform::{Actions, TranslationEngine};

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that stop the relay
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Counters kept across polling cycles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub cycles: u64,
    pub events: u64,
    pub unmapped: u64,
    pub actions: u64,
    pub emit_errors: u64,
}

/// Single-threaded relay from IR decoder to HID emitter.
///
/// Each cycle waits at most one poll interval for an event, so the hold
/// timeout is checked even while the remote is silent.
pub struct Relay<D: Decoder, E: HidEmitter, C: Clock> {
    decoder: D,
    engine: TranslationEngine,
    emitter: E,
    clock: C,
    stats: RelayStats,
}

impl<D: Decoder, E: HidEmitter, C: Clock> Relay<D, E, C> {
    pub fn new(decoder: D, engine: TranslationEngine, emitter: E, clock: C) -> Self {
        Self {
            decoder,
            engine,
            emitter,
            clock,
            stats: RelayStats::default(),
        }
    }

    /// Run one polling cycle. Returns the actions handed to the emitter.
    pub fn run_once(&mut self) -> RelayResult<Actions> {
        let timeout = self.engine.timing().poll_interval();
        let event = self.decoder.next_event(timeout)?;
        let now = self.clock.now();

        self.stats.cycles += 1;
        if let Some(event) = event {
            self.stats.events += 1;
            if !self.engine.keymap().contains(event.code) {
                self.stats.unmapped += 1;
            }
            log::trace!("IR {}", event);
        }

        let actions = self.engine.step(event, now);
        self.emit(&actions);
        Ok(actions)
    }

    /// Cycle until `running` is cleared, then release anything held
    pub fn run(&mut self, running: &AtomicBool) -> RelayResult<()> {
        log::info!(
            "Relaying with keymap '{}' ({} codes, release timeout {}ms)",
            self.engine.keymap().name(),
            self.engine.keymap().len(),
            self.engine.timing().release_timeout_ms
        );

        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.run_once() {
                // Leave the host with no stuck key before bailing out
                if let Err(release_err) = self.shutdown() {
                    log::warn!("Failed to release keys after relay error: {}", release_err);
                }
                return Err(e);
            }
        }

        self.shutdown()
    }

    /// Release the held key and anything the emitter still holds
    pub fn shutdown(&mut self) -> RelayResult<()> {
        let actions = self.engine.release_all();
        self.emit(&actions);
        self.emitter.release_all()?;
        log::debug!("Relay stopped: {:?}", self.stats);
        Ok(())
    }

    /// Emit failures are logged and counted; the relay keeps going
    fn emit(&mut self, actions: &Actions) {
        for action in actions {
            self.stats.actions += 1;
            log::debug!("Emit {}", action);
            if let Err(e) = self.emitter.apply(*action) {
                self.stats.emit_errors += 1;
                log::error!("Failed to emit {}: {}", action, e);
            }
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn engine(&self) -> &TranslationEngine {
        &self.engine
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn into_emitter(self) -> E {
        self.emitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{IrEvent, ManualClock, ScriptDecoder, Timestamp};
    use crate::mapping::{KeyMapping, Keymap};
    use crate::transform::Timing;
    use crate::{Combo, Key, KeyAction};

    /// Emitter whose writes always fail
    struct BrokenEmitter;

    impl HidEmitter for BrokenEmitter {
        fn press(&mut self, _combo: Combo) -> Result<(), OutputError> {
            Err(OutputError::Write(std::io::Error::other("unplugged")))
        }

        fn release(&mut self, _combo: Combo) -> Result<(), OutputError> {
            Err(OutputError::Write(std::io::Error::other("unplugged")))
        }

        fn release_all(&mut self) -> Result<(), OutputError> {
            Ok(())
        }
    }

    /// Decoder that fails once its events run out
    struct FailingDecoder(Vec<IrEvent>);

    impl Decoder for FailingDecoder {
        fn next_event(
            &mut self,
            _timeout: std::time::Duration,
        ) -> Result<Option<IrEvent>, DecoderError> {
            match self.0.pop() {
                Some(event) => Ok(Some(event)),
                None => Err(DecoderError::Io(std::io::Error::other("device gone"))),
            }
        }
    }

    /// Emitter that can press but never release
    #[derive(Default)]
    struct StuckEmitter {
        pressed: Vec<Combo>,
    }

    impl HidEmitter for StuckEmitter {
        fn press(&mut self, combo: Combo) -> Result<(), OutputError> {
            self.pressed.push(combo);
            Ok(())
        }

        fn release(&mut self, _combo: Combo) -> Result<(), OutputError> {
            Err(OutputError::Write(std::io::Error::other("unplugged")))
        }

        fn release_all(&mut self) -> Result<(), OutputError> {
            Err(OutputError::Write(std::io::Error::other("unplugged")))
        }
    }

    fn engine() -> TranslationEngine {
        TranslationEngine::new(
            Keymap::from_entries("test", [KeyMapping::new(0x800f1422, Key::ENTER)]),
            Timing::default(),
        )
    }

    #[test]
    fn test_run_once_relays_press_and_release() {
        let clock = ManualClock::new(0);
        let decoder = ScriptDecoder::new(&clock, [IrEvent::press(0x800f1422, Timestamp(0))]);
        let mut relay = Relay::new(decoder, engine(), Vec::<KeyAction>::new(), &clock);

        assert_eq!(relay.run_once().unwrap().len(), 1);
        clock.set(150);
        assert!(relay.run_once().unwrap().is_empty());
        clock.set(201);
        assert_eq!(relay.run_once().unwrap().len(), 1);

        assert_eq!(
            relay.emitter().as_slice(),
            &[KeyAction::down(Key::ENTER.into()), KeyAction::up(Key::ENTER.into())]
        );
        let stats = relay.stats();
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.events, 1);
        assert_eq!(stats.actions, 2);
    }

    #[test]
    fn test_emit_errors_do_not_stop_relay() {
        let clock = ManualClock::new(0);
        let decoder = ScriptDecoder::new(
            &clock,
            [
                IrEvent::press(0x800f1422, Timestamp(0)),
                IrEvent::press(0x1, Timestamp(0)),
            ],
        );
        let mut relay = Relay::new(decoder, engine(), BrokenEmitter, &clock);

        assert!(relay.run_once().is_ok());
        assert!(relay.run_once().is_ok());
        assert_eq!(relay.stats().emit_errors, 1);
        assert_eq!(relay.stats().unmapped, 1);
    }

    #[test]
    fn test_run_stops_and_releases() {
        let clock = ManualClock::new(0);
        let decoder = ScriptDecoder::new(&clock, [IrEvent::press(0x800f1422, Timestamp(0))]);
        let mut relay = Relay::new(decoder, engine(), Vec::<KeyAction>::new(), &clock);
        relay.run_once().unwrap();

        let running = AtomicBool::new(false);
        relay.run(&running).unwrap();
        assert_eq!(
            relay.into_emitter(),
            vec![KeyAction::down(Key::ENTER.into()), KeyAction::up(Key::ENTER.into())]
        );
    }

    #[test]
    fn test_decoder_error_survives_failed_release() {
        let clock = ManualClock::new(0);
        let decoder = FailingDecoder(vec![IrEvent::press(0x800f1422, Timestamp(0))]);
        let mut relay = Relay::new(decoder, engine(), StuckEmitter::default(), &clock);

        let running = AtomicBool::new(true);
        let err = relay.run(&running).unwrap_err();
        assert!(matches!(err, RelayError::Decoder(DecoderError::Io(_))));
        // The held key was still handed to the emitter for release
        assert_eq!(relay.stats().emit_errors, 1);
        assert!(relay.engine().held().is_none());
    }
}
