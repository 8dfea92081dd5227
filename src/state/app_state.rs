//! Main application state management

use std::{
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::{
    config::Config,
    display::{DisplaySnapshot, WatchDisplay},
    engine::{Completion, EngineSnapshot, PromptOutcome, TimerEngine, TimerMode},
    notifier::{Banner, BannerBoard, DesktopNotifications, Permission, ShellNotifier, SoundPlayer},
    ticker::{IntervalTicker, SubscriptionId, Tick},
};

/// Nominal countdown resolution
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Shell state: the single timer engine plus what is shown around it
pub struct AppState {
    /// The one engine instance; every command and tick goes through this lock
    pub engine: Mutex<TimerEngine>,
    /// Completion banner shared with the notifier
    pub banner: BannerBoard,
    /// Latest rendered display
    pub display_rx: watch::Receiver<DisplaySnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        engine: TimerEngine,
        banner: BannerBoard,
        display_rx: watch::Receiver<DisplaySnapshot>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            banner,
            display_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Wire up the engine with the server's display, notifier and 1 Hz
    /// ticker. Returns the tick receiver the tick pump must drain.
    pub fn from_config(config: &Config) -> Result<(Self, mpsc::UnboundedReceiver<Tick>), String> {
        let durations = config.duration_settings()?;
        let (display, display_rx) = WatchDisplay::new();
        let (ticker, tick_rx) = IntervalTicker::new(TICK_PERIOD);
        let banner = BannerBoard::default();

        let sound = (!config.no_sound).then(SoundPlayer::new);
        let desktop = if config.no_desktop_notify {
            DesktopNotifications::with_permission(Permission::Denied)
        } else {
            DesktopNotifications::new()
        };
        let notifier = ShellNotifier::new(banner.clone(), sound, Some(desktop));

        let engine = TimerEngine::new(
            durations,
            Box::new(display),
            Box::new(notifier),
            Box::new(ticker),
        );

        let state = Self::new(engine, banner, display_rx, config.port, config.host.clone());
        Ok((state, tick_rx))
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, TimerEngine>, String> {
        self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Apply a command to the engine and record it as the last action
    pub fn update_engine<F, R>(&self, action: &str, updater: F) -> Result<(R, EngineSnapshot), String>
    where
        F: FnOnce(&mut TimerEngine) -> R,
    {
        let mut engine = self.lock_engine()?;
        let result = updater(&mut *engine);
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok((result, snapshot))
    }

    /// Start the timer; `prompt` answers the Focus label question
    pub fn start(&self, mut prompt: PromptOutcome) -> Result<(bool, EngineSnapshot), String> {
        info!("Start requested");
        self.update_engine("start", |engine| engine.start(&mut prompt))
    }

    pub fn pause(&self) -> Result<(bool, EngineSnapshot), String> {
        info!("Pause requested");
        self.update_engine("pause", TimerEngine::pause)
    }

    pub fn reset(&self) -> Result<EngineSnapshot, String> {
        info!("Reset requested");
        self.update_engine("reset", TimerEngine::reset)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn switch_mode(&self, mode: TimerMode) -> Result<EngineSnapshot, String> {
        self.update_engine(&format!("mode:{}", mode), |engine| engine.switch_mode(mode))
            .map(|(_, snapshot)| snapshot)
    }

    /// Set a duration from free-text minutes; returns the clamped value kept
    pub fn set_duration(&self, mode: TimerMode, raw_minutes: &str) -> Result<(u32, EngineSnapshot), String> {
        self.update_engine(&format!("duration:{}", mode), |engine| {
            engine.set_duration_input(mode, raw_minutes)
        })
    }

    pub fn set_focus_label(&self, label: Option<&str>) -> Result<(bool, EngineSnapshot), String> {
        self.update_engine("label", |engine| engine.set_focus_label(label))
    }

    /// Deliver a tick from the ticker. Not recorded as a command.
    pub fn tick(&self, subscription: SubscriptionId) -> Result<Option<Completion>, String> {
        let mut engine = self.lock_engine()?;
        Ok(engine.on_tick(subscription))
    }

    pub fn get_engine_snapshot(&self) -> Result<EngineSnapshot, String> {
        self.lock_engine().map(|engine| engine.snapshot())
    }

    pub fn get_display(&self) -> DisplaySnapshot {
        self.display_rx.borrow().clone()
    }

    pub fn get_banner(&self) -> Result<Option<Banner>, String> {
        self.banner.current()
    }

    pub fn dismiss_notification(&self) -> Result<bool, String> {
        let dismissed = self.banner.dismiss()?;
        if dismissed {
            info!("Notification dismissed");
        }
        Ok(dismissed)
    }

    /// One-time desktop notification permission request. Blocks on the
    /// session bus, so run it via `spawn_blocking`.
    pub fn request_notification_permission(&self) -> Result<(), String> {
        self.lock_engine()?.request_notification_permission();
        Ok(())
    }

    /// Stop the countdown on shutdown and log the session totals
    pub fn shutdown(&self) {
        match self.lock_engine() {
            Ok(mut engine) => {
                engine.pause();
                info!(
                    "Final stats: sessions={}, focus_minutes={}",
                    engine.session_count(),
                    engine.total_focus_minutes()
                );
            }
            Err(e) => warn!("Failed to stop timer on shutdown: {}", e),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
