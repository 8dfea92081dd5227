//! Process utilities
//!
//! Signal handling used to shut the server down cleanly.

pub mod signals;

pub use signals::shutdown_signal;
