//! Configuration and CLI argument handling

use clap::Parser;

use crate::engine::{DurationLimits, DurationSettings};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pomodoro-timer")]
#[command(about = "A Pomodoro countdown timer controlled over a local HTTP API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus duration in minutes
    #[arg(short, long, default_value = "25")]
    pub focus: u32,

    /// Short break duration in minutes
    #[arg(short, long, default_value = "5")]
    pub short_break: u32,

    /// Long break duration in minutes
    #[arg(short, long, default_value = "15")]
    pub long_break: u32,

    /// Smallest focus duration accepted, in minutes
    #[arg(long, default_value = "1")]
    pub focus_min: u32,

    /// Largest focus duration accepted, in minutes
    #[arg(long, default_value = "60")]
    pub focus_max: u32,

    /// Smallest break duration accepted (short and long), in minutes
    #[arg(long, default_value = "1")]
    pub break_min: u32,

    /// Largest break duration accepted (short and long), in minutes
    #[arg(long, default_value = "30")]
    pub break_max: u32,

    /// Do not play the completion chime
    #[arg(long)]
    pub no_sound: bool,

    /// Do not send OS desktop notifications
    #[arg(long)]
    pub no_desktop_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Validated per-mode durations. Defaults outside their limits are clamped.
    pub fn duration_settings(&self) -> Result<DurationSettings, String> {
        let focus_limits = DurationLimits::new(self.focus_min, self.focus_max)
            .map_err(|e| format!("Invalid focus limits: {}", e))?;
        let break_limits = DurationLimits::new(self.break_min, self.break_max)
            .map_err(|e| format!("Invalid break limits: {}", e))?;

        Ok(DurationSettings::new(
            (self.focus, focus_limits),
            (self.short_break, break_limits),
            (self.long_break, break_limits),
        ))
    }
}
