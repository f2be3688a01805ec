// irkbd Transform Module
// Translation of decoded IR events into key actions

pub mod engine;

pub use engine::{
    Actions, EngineState, HeldKeyState, Timing, TranslationEngine, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RELEASE_TIMEOUT_MS, DEFAULT_REPEAT_INTERVAL_MS,
};
