//! Timer modes and their fixed texts

use std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// The interval kind the timer is currently counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Identifier used in URLs and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short-break",
            TimerMode::LongBreak => "long-break",
        }
    }

    /// Human label shown above the clock
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus Time",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Message surfaced when an interval of this mode runs out
    pub fn completion_message(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus session completed! Time for a break.",
            TimerMode::ShortBreak => "Short break completed! Ready to focus?",
            TimerMode::LongBreak => "Long break completed! Ready to focus?",
        }
    }

    pub fn is_focus(&self) -> bool {
        matches!(self, TimerMode::Focus)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "focus" => Ok(TimerMode::Focus),
            "short-break" | "short_break" | "short" => Ok(TimerMode::ShortBreak),
            "long-break" | "long_break" | "long" => Ok(TimerMode::LongBreak),
            other => Err(format!("Unknown timer mode: {}", other)),
        }
    }
}
