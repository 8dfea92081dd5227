//! State management module
//!
//! Holds the shell-owned timer engine and the presentation state around it.

pub mod app_state;

// Re-export main types
pub use app_state::{AppState, TICK_PERIOD};
