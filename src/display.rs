//! Display sink: turns engine state into what an operator sees

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::engine::TimerMode;

/// Suffix mirrored into the window title
pub const TITLE_SUFFIX: &str = "Pomodoro Timer";

/// How long the completion animation flag stays raised
pub const CELEBRATION: Duration = Duration::from_millis(500);

/// Rendering collaborator of the timer engine
pub trait Display: Send {
    fn render(&mut self, remaining_seconds: u32, mode: TimerMode);
    fn render_stats(&mut self, session_count: u32, total_focus_minutes: f64);
    fn render_focus_label(&mut self, label: Option<&str>);
    /// Brief completion animation. Optional.
    fn celebrate(&mut self) {}
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn window_title(seconds: u32) -> String {
    format!("{} - {}", format_clock(seconds), TITLE_SUFFIX)
}

/// Total focus time as shown in the stats line, e.g. `25m`
pub fn format_total_minutes(total_focus_minutes: f64) -> String {
    format!("{}m", total_focus_minutes.round() as u64)
}

/// Everything currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub mode: TimerMode,
    pub time: String,
    pub label: String,
    pub title: String,
    pub sessions: u32,
    pub total_time: String,
    pub focus_label: Option<String>,
    pub completing: bool,
}

impl DisplaySnapshot {
    pub fn blank() -> Self {
        Self {
            mode: TimerMode::Focus,
            time: format_clock(0),
            label: TimerMode::Focus.label().to_string(),
            title: window_title(0),
            sessions: 0,
            total_time: format_total_minutes(0.0),
            focus_label: None,
            completing: false,
        }
    }
}

/// Display that publishes a [`DisplaySnapshot`] on a watch channel
#[derive(Debug)]
pub struct WatchDisplay {
    tx: Arc<watch::Sender<DisplaySnapshot>>,
    celebration_generation: Arc<AtomicU64>,
}

impl WatchDisplay {
    pub fn new() -> (Self, watch::Receiver<DisplaySnapshot>) {
        let (tx, rx) = watch::channel(DisplaySnapshot::blank());
        let display = Self {
            tx: Arc::new(tx),
            celebration_generation: Arc::new(AtomicU64::new(0)),
        };
        (display, rx)
    }
}

impl Display for WatchDisplay {
    fn render(&mut self, remaining_seconds: u32, mode: TimerMode) {
        self.tx.send_modify(|snapshot| {
            snapshot.mode = mode;
            snapshot.time = format_clock(remaining_seconds);
            snapshot.label = mode.label().to_string();
            snapshot.title = window_title(remaining_seconds);
            if !mode.is_focus() {
                snapshot.focus_label = None;
            }
        });
    }

    fn render_stats(&mut self, session_count: u32, total_focus_minutes: f64) {
        self.tx.send_modify(|snapshot| {
            snapshot.sessions = session_count;
            snapshot.total_time = format_total_minutes(total_focus_minutes);
        });
    }

    fn render_focus_label(&mut self, label: Option<&str>) {
        self.tx.send_modify(|snapshot| {
            snapshot.focus_label = label
                .filter(|text| !text.is_empty() && snapshot.mode.is_focus())
                .map(str::to_string);
        });
    }

    fn celebrate(&mut self) {
        let generation = self.celebration_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|snapshot| snapshot.completing = true);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime for the completion animation timer");
            return;
        };
        let tx = Arc::clone(&self.tx);
        let current = Arc::clone(&self.celebration_generation);
        runtime.spawn(async move {
            tokio::time::sleep(CELEBRATION).await;
            // A later completion owns the flag now
            if current.load(Ordering::SeqCst) == generation {
                tx.send_modify(|snapshot| snapshot.completing = false);
            }
        });
    }
}
