//! Pomodoro Timer - a countdown timer for focus and break intervals
//!
//! The core is [`engine::TimerEngine`], a tick-driven state machine that
//! renders through a [`display::Display`] and reports completed intervals to a
//! [`notifier::Notifier`]. The rest of the crate hosts one engine behind a
//! small HTTP control API.

pub mod config;
pub mod engine;
pub mod ticker;
pub mod display;
pub mod notifier;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{TimerEngine, TimerMode};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
