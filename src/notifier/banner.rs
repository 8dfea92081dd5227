//! Dismissible completion banner with auto-dismiss

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default time a banner stays up without being dismissed
pub const AUTO_DISMISS: Duration = Duration::from_millis(5000);

/// A completion message currently shown to the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub generation: u64,
}

/// Shared slot holding at most one visible banner
#[derive(Debug, Clone)]
pub struct BannerBoard {
    current: Arc<Mutex<Option<Banner>>>,
    generation: Arc<AtomicU64>,
    auto_dismiss: Duration,
}

impl BannerBoard {
    pub fn new(auto_dismiss: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            auto_dismiss,
        }
    }

    /// Show a banner and schedule its auto-dismiss; returns its generation
    pub fn show(&self, message: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let banner = Banner {
            message: message.to_string(),
            shown_at: Utc::now(),
            generation,
        };

        match self.current.lock() {
            Ok(mut current) => *current = Some(banner),
            Err(e) => {
                warn!("Failed to lock banner state: {}", e);
                return generation;
            }
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let board = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(board.auto_dismiss).await;
                    if board.dismiss_generation(generation) {
                        debug!("Banner {} auto-dismissed", generation);
                    }
                });
            }
            Err(_) => debug!("No runtime for banner auto-dismiss"),
        }

        generation
    }

    /// Hide whatever banner is showing. Returns whether one was visible.
    pub fn dismiss(&self) -> Result<bool, String> {
        let mut current = self.current.lock()
            .map_err(|e| format!("Failed to lock banner state: {}", e))?;
        Ok(current.take().is_some())
    }

    /// Hide the banner only if it is still the one with `generation`
    fn dismiss_generation(&self, generation: u64) -> bool {
        match self.current.lock() {
            Ok(mut current) => {
                if current.as_ref().map(|b| b.generation) == Some(generation) {
                    *current = None;
                    true
                } else {
                    false
                }
            }
            Err(e) => {
                warn!("Failed to lock banner state: {}", e);
                false
            }
        }
    }

    pub fn current(&self) -> Result<Option<Banner>, String> {
        self.current.lock()
            .map(|banner| banner.clone())
            .map_err(|e| format!("Failed to lock banner state: {}", e))
    }
}

impl Default for BannerBoard {
    fn default() -> Self {
        Self::new(AUTO_DISMISS)
    }
}
