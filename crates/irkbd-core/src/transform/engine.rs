// irkbd Translation Engine
// Hold/release state machine turning decoded IR events into key actions
//
// IR remotes never say "released": a held button retransmits every
// repeat interval, and the key is let go once transmissions stop for
// longer than the release timeout. At most one key is held at a time.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::input::{IrEvent, Timestamp};
use crate::mapping::{KeyMapping, Keymap};
use crate::KeyAction;

pub const DEFAULT_RELEASE_TIMEOUT_MS: u32 = 200;
/// RC6 MCE frame cadence
pub const DEFAULT_REPEAT_INTERVAL_MS: u32 = 115;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Differences beyond this are treated as an event from the past
const HALF_RANGE: u32 = u32::MAX / 2;

/// Actions produced by one engine step; never more than two
pub type Actions = SmallVec<[KeyAction; 2]>;

/// Timing knobs for the hold/release machine and the polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timing {
    /// Silence after which a held key is released
    pub release_timeout_ms: u32,
    /// How often the remote retransmits while a button is held
    pub repeat_interval_ms: u32,
    /// Longest wait for the decoder in one polling cycle
    pub poll_interval_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            release_timeout_ms: DEFAULT_RELEASE_TIMEOUT_MS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timing {
    /// A timeout at or below the repeat interval would release keys
    /// between two repeats of a held button
    pub fn is_valid(&self) -> bool {
        self.release_timeout_ms > self.repeat_interval_ms && self.poll_interval_ms > 0
    }

    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.release_timeout_ms.into())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.into())
    }
}

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Pressed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "Idle"),
            EngineState::Pressed => write!(f, "Pressed"),
        }
    }
}

/// The key currently held down on behalf of the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldKeyState {
    pub mapping: KeyMapping,
    /// Timestamp of the last event that kept this key held
    pub last_seen: Timestamp,
    pub pressed: bool,
}

/// IR event to key action translator
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    keymap: Keymap,
    timing: Timing,
    held: Option<HeldKeyState>,
}

impl TranslationEngine {
    pub fn new(keymap: Keymap, timing: Timing) -> Self {
        Self {
            keymap,
            timing,
            held: None,
        }
    }

    pub fn state(&self) -> EngineState {
        match self.held {
            Some(held) if held.pressed => EngineState::Pressed,
            _ => EngineState::Idle,
        }
    }

    pub fn held(&self) -> Option<&HeldKeyState> {
        self.held.as_ref()
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Apply one decoded event.
    ///
    /// A hold that already expired at the event's timestamp is released
    /// first, so a late repeat after a gap re-presses instead of extending
    /// a stale hold.
    pub fn handle(&mut self, event: IrEvent) -> Actions {
        let mut actions = self.poll(event.timestamp);

        let Some(mapping) = self.keymap.lookup(event.code).copied() else {
            log::debug!("Unmapped code {}", event);
            return actions;
        };

        match self.held.as_mut() {
            Some(held) if held.mapping.code == mapping.code && event.repeat => {
                held.last_seen = event.timestamp;
                log::trace!("Repeat {} keeps {} held", event.code, mapping.combo);
            }
            Some(held) => {
                log::debug!("Switch {} -> {}", held.mapping.combo, mapping.combo);
                actions.push(KeyAction::up(held.mapping.combo));
                actions.push(KeyAction::down(mapping.combo));
                *held = HeldKeyState {
                    mapping,
                    last_seen: event.timestamp,
                    pressed: true,
                };
            }
            None => {
                if event.repeat {
                    log::debug!("Repeat {} while idle, treating as press", event.code);
                }
                log::debug!("Press {} ({})", mapping.combo, event.code);
                actions.push(KeyAction::down(mapping.combo));
                self.held = Some(HeldKeyState {
                    mapping,
                    last_seen: event.timestamp,
                    pressed: true,
                });
            }
        }

        actions
    }

    /// Release the held key if the remote has been silent longer than the
    /// release timeout as of `now`
    pub fn poll(&mut self, now: Timestamp) -> Actions {
        let mut actions = Actions::new();
        if let Some(held) = self.held {
            let elapsed = now.millis_since(held.last_seen);
            // Wrapped differences mean `now` predates the hold
            if elapsed <= HALF_RANGE && elapsed > self.timing.release_timeout_ms {
                log::debug!("Release {} after {}ms of silence", held.mapping.combo, elapsed);
                actions.push(KeyAction::up(held.mapping.combo));
                self.held = None;
            }
        }
        actions
    }

    /// One polling cycle: apply the event if there is one, then check the
    /// timeout against `now`
    pub fn step(&mut self, event: Option<IrEvent>, now: Timestamp) -> Actions {
        let mut actions = match event {
            Some(event) => self.handle(event),
            None => Actions::new(),
        };
        actions.extend(self.poll(now));
        actions
    }

    /// Release whatever is held, regardless of timing
    pub fn release_all(&mut self) -> Actions {
        let mut actions = Actions::new();
        if let Some(held) = self.held.take() {
            log::debug!("Releasing {}", held.mapping.combo);
            actions.push(KeyAction::up(held.mapping.combo));
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Combo, Key, Modifiers};

    const OK: u32 = 0x800f_1422;
    const TWO: u32 = 0x800f_1402;
    const UNMAPPED: u32 = 0x800f_14ff;

    fn engine() -> TranslationEngine {
        let keymap = Keymap::from_entries(
            "test",
            [
                KeyMapping::new(OK, Key::ENTER),
                KeyMapping::new(TWO, Combo::new(Modifiers::CTRL, Key::KEY_2)),
            ],
        );
        TranslationEngine::new(keymap, Timing::default())
    }

    fn ts(ms: u32) -> Timestamp {
        Timestamp(ms)
    }

    #[test]
    fn test_timing_default() {
        let timing = Timing::default();
        assert_eq!(timing.release_timeout_ms, 200);
        assert_eq!(timing.repeat_interval_ms, 115);
        assert!(timing.is_valid());
        assert_eq!(timing.release_timeout(), Duration::from_millis(200));
    }

    #[test]
    fn test_timing_validation() {
        let mut timing = Timing::default();
        timing.release_timeout_ms = 115;
        assert!(!timing.is_valid());
        timing.release_timeout_ms = 116;
        assert!(timing.is_valid());
        timing.poll_interval_ms = 0;
        assert!(!timing.is_valid());
    }

    #[test]
    fn test_press_then_timeout() {
        let mut engine = engine();
        let enter = Combo::plain(Key::ENTER);

        let actions = engine.handle(IrEvent::press(OK, ts(0)));
        assert_eq!(actions.as_slice(), &[KeyAction::down(enter)]);
        assert_eq!(engine.state(), EngineState::Pressed);

        // Exactly at the timeout is still held
        assert!(engine.poll(ts(200)).is_empty());
        assert_eq!(engine.poll(ts(201)).as_slice(), &[KeyAction::up(enter)]);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.poll(ts(500)).is_empty());
    }

    #[test]
    fn test_repeat_refreshes_hold() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(0)));

        assert!(engine.handle(IrEvent::repeat(OK, ts(115))).is_empty());
        assert!(engine.handle(IrEvent::repeat(OK, ts(230))).is_empty());
        assert!(engine.poll(ts(400)).is_empty());
        assert_eq!(engine.held().map(|h| h.last_seen), Some(ts(230)));
        assert_eq!(engine.poll(ts(431)).len(), 1);
    }

    #[test]
    fn test_switch_releases_before_press() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(0)));

        let actions = engine.handle(IrEvent::repeat(TWO, ts(50)));
        assert_eq!(
            actions.as_slice(),
            &[
                KeyAction::up(Key::ENTER.into()),
                KeyAction::down(Combo::new(Modifiers::CTRL, Key::KEY_2)),
            ]
        );
        assert_eq!(engine.held().map(|h| h.mapping.code.0), Some(TWO));
    }

    #[test]
    fn test_unmapped_does_not_refresh() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(0)));

        assert!(engine.handle(IrEvent::press(UNMAPPED, ts(150))).is_empty());
        assert_eq!(engine.held().map(|h| h.last_seen), Some(ts(0)));
        assert_eq!(engine.poll(ts(201)).len(), 1);
    }

    #[test]
    fn test_unmapped_while_idle() {
        let mut engine = engine();
        assert!(engine.handle(IrEvent::press(UNMAPPED, ts(0))).is_empty());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_fresh_press_of_held_key_retriggers() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(0)));
        let actions = engine.handle(IrEvent::press(OK, ts(100)));
        assert_eq!(
            actions.as_slice(),
            &[KeyAction::up(Key::ENTER.into()), KeyAction::down(Key::ENTER.into())]
        );
    }

    #[test]
    fn test_repeat_while_idle_presses() {
        let mut engine = engine();
        let actions = engine.handle(IrEvent::repeat(OK, ts(0)));
        assert_eq!(actions.as_slice(), &[KeyAction::down(Key::ENTER.into())]);
    }

    #[test]
    fn test_late_repeat_releases_then_represses() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(0)));
        let actions = engine.handle(IrEvent::repeat(OK, ts(300)));
        assert_eq!(
            actions.as_slice(),
            &[KeyAction::up(Key::ENTER.into()), KeyAction::down(Key::ENTER.into())]
        );
        assert_eq!(engine.held().map(|h| h.last_seen), Some(ts(300)));
    }

    #[test]
    fn test_timeout_across_wraparound() {
        let mut engine = engine();
        let start = ts(u32::MAX - 50);
        engine.handle(IrEvent::press(OK, start));

        assert!(engine.poll(start.add_millis(100)).is_empty());
        assert!(engine.poll(start.add_millis(200)).is_empty());
        assert_eq!(engine.poll(start.add_millis(201)).len(), 1);
    }

    #[test]
    fn test_stale_now_does_not_release() {
        let mut engine = engine();
        engine.handle(IrEvent::press(OK, ts(1000)));
        assert!(engine.poll(ts(990)).is_empty());
        assert_eq!(engine.state(), EngineState::Pressed);
    }

    #[test]
    fn test_step_combines_event_and_timeout() {
        let mut engine = engine();
        assert_eq!(engine.step(Some(IrEvent::press(OK, ts(0))), ts(0)).len(), 1);
        assert!(engine.step(None, ts(150)).is_empty());
        assert_eq!(
            engine.step(None, ts(250)).as_slice(),
            &[KeyAction::up(Key::ENTER.into())]
        );
    }

    #[test]
    fn test_release_all() {
        let mut engine = engine();
        assert!(engine.release_all().is_empty());
        engine.handle(IrEvent::press(TWO, ts(0)));
        assert_eq!(
            engine.release_all().as_slice(),
            &[KeyAction::up(Combo::new(Modifiers::CTRL, Key::KEY_2))]
        );
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
