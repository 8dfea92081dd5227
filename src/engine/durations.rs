//! Per-mode duration configuration and clamping

use serde::{Deserialize, Serialize};

use super::TimerMode;

/// Longest duration, in minutes, whose length in seconds still fits a `u32`
pub const MAX_MINUTES: u32 = u32::MAX / 60;

/// Inclusive bounds, in minutes, a mode's duration is clamped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationLimits {
    pub min: u32,
    pub max: u32,
}

impl DurationLimits {
    /// Validate a bound pair; zero-length intervals are not allowed
    pub fn new(min: u32, max: u32) -> Result<Self, String> {
        if min == 0 {
            return Err("Minimum duration must be at least 1 minute".to_string());
        }
        if min > max {
            return Err(format!("Minimum duration {} exceeds maximum {}", min, max));
        }
        if max > MAX_MINUTES {
            return Err(format!(
                "Maximum duration {} exceeds the limit of {} minutes",
                max, MAX_MINUTES
            ));
        }
        Ok(Self { min, max })
    }

    /// Clamp any input to the nearest bound. Never fails.
    pub fn clamp(&self, minutes: i64) -> u32 {
        minutes.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }

    pub fn focus_default() -> Self {
        Self { min: 1, max: 60 }
    }

    pub fn break_default() -> Self {
        Self { min: 1, max: 30 }
    }
}

/// One mode's configured length together with its limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDuration {
    pub minutes: u32,
    pub limits: DurationLimits,
}

impl ModeDuration {
    fn new(minutes: i64, limits: DurationLimits) -> Self {
        Self {
            minutes: limits.clamp(minutes),
            limits,
        }
    }
}

/// Configured durations for all three modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSettings {
    pub focus: ModeDuration,
    pub short_break: ModeDuration,
    pub long_break: ModeDuration,
}

impl DurationSettings {
    /// Build settings from minute values; each value is clamped into its limits
    pub fn new(
        focus: (u32, DurationLimits),
        short_break: (u32, DurationLimits),
        long_break: (u32, DurationLimits),
    ) -> Self {
        Self {
            focus: ModeDuration::new(i64::from(focus.0), focus.1),
            short_break: ModeDuration::new(i64::from(short_break.0), short_break.1),
            long_break: ModeDuration::new(i64::from(long_break.0), long_break.1),
        }
    }

    fn entry(&self, mode: TimerMode) -> &ModeDuration {
        match mode {
            TimerMode::Focus => &self.focus,
            TimerMode::ShortBreak => &self.short_break,
            TimerMode::LongBreak => &self.long_break,
        }
    }

    fn entry_mut(&mut self, mode: TimerMode) -> &mut ModeDuration {
        match mode {
            TimerMode::Focus => &mut self.focus,
            TimerMode::ShortBreak => &mut self.short_break,
            TimerMode::LongBreak => &mut self.long_break,
        }
    }

    pub fn minutes(&self, mode: TimerMode) -> u32 {
        self.entry(mode).minutes
    }

    pub fn seconds(&self, mode: TimerMode) -> u32 {
        self.minutes(mode).saturating_mul(60)
    }

    pub fn limits(&self, mode: TimerMode) -> DurationLimits {
        self.entry(mode).limits
    }

    /// Store a new duration for `mode`, returning the clamped value actually kept
    pub fn set(&mut self, mode: TimerMode, minutes: i64) -> u32 {
        let entry = self.entry_mut(mode);
        entry.minutes = entry.limits.clamp(minutes);
        entry.minutes
    }
}

impl Default for DurationSettings {
    fn default() -> Self {
        Self::new(
            (25, DurationLimits::focus_default()),
            (5, DurationLimits::break_default()),
            (15, DurationLimits::break_default()),
        )
    }
}

/// Read a free-text minute value. Fractions truncate toward zero; anything
/// that is not a finite number yields `None`.
pub fn parse_minutes(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(minutes) = raw.parse::<i64>() {
        return Some(minutes);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => None,
    }
}
