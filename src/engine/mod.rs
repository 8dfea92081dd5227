//! Timer engine module
//!
//! The Pomodoro state machine and the value types it works with.

pub mod durations;
pub mod mode;
pub mod prompt;
pub mod timer_engine;

// Re-export main types
pub use durations::{parse_minutes, DurationLimits, DurationSettings, ModeDuration, MAX_MINUTES};
pub use mode::TimerMode;
pub use prompt::{FocusPrompt, PromptOutcome};
pub use timer_engine::{Completion, EngineSnapshot, TimerEngine};
