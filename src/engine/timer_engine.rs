//! Countdown state machine
//!
//! ```text
//! Idle --start--> Running --tick to 0--> (completion) --> Idle
//!   ^                |
//!   +--pause/reset---+
//! ```
//!
//! The engine keeps only logical state. Rendering, completion side effects
//! and the periodic tick are delegated to injected collaborators. The tick
//! subscription handle is held exactly while running, so `running` is
//! derived from it rather than stored separately.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{parse_minutes, DurationSettings, FocusPrompt, PromptOutcome, TimerMode};
use crate::{
    display::Display,
    notifier::Notifier,
    ticker::{SubscriptionId, TickHandle, TickSource},
};

/// What happened when an interval ran out
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub mode: TimerMode,
    pub message: String,
    pub session_count: u32,
    pub total_focus_minutes: f64,
}

/// Serializable view of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: TimerMode,
    pub running: bool,
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub session_count: u32,
    pub total_focus_minutes: f64,
    pub focus_label: Option<String>,
    pub durations: DurationSettings,
}

pub struct TimerEngine {
    mode: TimerMode,
    durations: DurationSettings,
    duration_seconds: u32,
    remaining_seconds: u32,
    session_count: u32,
    total_focus_minutes: f64,
    focus_label: Option<String>,
    ticks: Option<TickHandle>,
    display: Box<dyn Display>,
    notifier: Box<dyn Notifier>,
    ticker: Box<dyn TickSource>,
}

impl TimerEngine {
    /// Create an idle engine in Focus mode and render its initial state
    pub fn new(
        durations: DurationSettings,
        display: Box<dyn Display>,
        notifier: Box<dyn Notifier>,
        ticker: Box<dyn TickSource>,
    ) -> Self {
        let duration_seconds = durations.seconds(TimerMode::Focus);
        let mut engine = Self {
            mode: TimerMode::Focus,
            durations,
            duration_seconds,
            remaining_seconds: duration_seconds,
            session_count: 0,
            total_focus_minutes: 0.0,
            focus_label: None,
            ticks: None,
            display,
            notifier,
            ticker,
        };
        engine.render_all();
        engine
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.ticks.is_some()
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn total_focus_minutes(&self) -> f64 {
        self.total_focus_minutes
    }

    pub fn focus_label(&self) -> Option<&str> {
        self.focus_label.as_deref()
    }

    pub fn durations(&self) -> &DurationSettings {
        &self.durations
    }

    /// Id of the live tick subscription, if running
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.ticks.as_ref().map(TickHandle::id)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            running: self.is_running(),
            duration_seconds: self.duration_seconds,
            remaining_seconds: self.remaining_seconds,
            session_count: self.session_count,
            total_focus_minutes: self.total_focus_minutes,
            focus_label: self.focus_label.clone(),
            durations: self.durations,
        }
    }

    /// Start counting down. In Focus mode the prompt is asked for a label
    /// first; a cancelled prompt leaves the engine idle. Returns whether the
    /// engine is running afterwards.
    pub fn start(&mut self, prompt: &mut dyn FocusPrompt) -> bool {
        if self.is_running() {
            debug!("Start ignored, timer already running");
            return true;
        }

        if self.mode.is_focus() {
            match prompt.prompt_focus_label() {
                PromptOutcome::Cancelled => {
                    info!("Focus prompt cancelled, timer not started");
                    return false;
                }
                PromptOutcome::Confirmed(text) => {
                    let text = text.trim();
                    self.focus_label = (!text.is_empty()).then(|| text.to_string());
                }
                PromptOutcome::Skipped => {}
            }
            self.render_focus_label();
        }

        if self.remaining_seconds == 0 {
            // Previous run finished; count the same interval again from the top
            self.remaining_seconds = self.duration_seconds;
            self.display.render(self.remaining_seconds, self.mode);
        }

        self.ticks = Some(self.ticker.subscribe());
        info!(
            "Timer started: mode={}, remaining={}s, label={:?}",
            self.mode, self.remaining_seconds, self.focus_label
        );
        true
    }

    /// Advance the countdown by one second. Ignored while idle.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.display.render(self.remaining_seconds, self.mode);

        if self.remaining_seconds == 0 {
            Some(self.complete())
        } else {
            None
        }
    }

    /// Tick delivered by a subscription; stale subscriptions are ignored
    pub fn on_tick(&mut self, subscription: SubscriptionId) -> Option<Completion> {
        if self.subscription_id() != Some(subscription) {
            debug!("Ignoring tick from stale subscription {}", subscription);
            return None;
        }
        self.tick()
    }

    /// Stop counting down, keeping the remaining time. Returns whether the
    /// timer was running.
    pub fn pause(&mut self) -> bool {
        match self.ticks.take() {
            Some(handle) => {
                drop(handle);
                info!("Timer paused at {}s", self.remaining_seconds);
                true
            }
            None => false,
        }
    }

    /// Stop and rewind the current interval; clears the focus label
    pub fn reset(&mut self) {
        self.pause();
        self.remaining_seconds = self.duration_seconds;
        self.focus_label = None;
        self.render_all();
        debug!("Timer reset to {}s ({})", self.duration_seconds, self.mode);
    }

    /// Change mode and load its configured duration. Always leaves the
    /// engine idle.
    pub fn switch_mode(&mut self, mode: TimerMode) {
        info!("Switching mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.duration_seconds = self.durations.seconds(mode);
        self.focus_label = None;
        self.reset();
    }

    /// Store a clamped duration for `mode` and return the value kept. When
    /// `mode` is active the countdown is rewritten immediately and any
    /// elapsed time in it is discarded.
    pub fn set_duration(&mut self, mode: TimerMode, minutes: i64) -> u32 {
        let stored = self.durations.set(mode, minutes);
        if stored as i64 != minutes {
            debug!("Duration for {} clamped from {} to {}", mode, minutes, stored);
        }

        if mode == self.mode {
            self.duration_seconds = self.durations.seconds(mode);
            self.remaining_seconds = self.duration_seconds;
            self.display.render(self.remaining_seconds, self.mode);
        }

        info!("Duration for {} set to {} minutes", mode, stored);
        stored
    }

    /// Free-text variant of [`set_duration`](Self::set_duration); input that
    /// is not a number lands on the mode's minimum
    pub fn set_duration_input(&mut self, mode: TimerMode, raw: &str) -> u32 {
        let minutes = parse_minutes(raw)
            .unwrap_or_else(|| i64::from(self.durations.limits(mode).min));
        self.set_duration(mode, minutes)
    }

    /// Replace the focus label. Only meaningful in Focus mode; returns
    /// whether the label was applied.
    pub fn set_focus_label(&mut self, label: Option<&str>) -> bool {
        if !self.mode.is_focus() {
            debug!("Focus label ignored in {} mode", self.mode);
            return false;
        }
        self.focus_label = label
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self.render_focus_label();
        true
    }

    /// Forward the one-time OS permission request to the notifier
    pub fn request_notification_permission(&mut self) {
        self.notifier.request_permission();
    }

    fn complete(&mut self) -> Completion {
        self.pause();

        if self.mode.is_focus() {
            self.session_count += 1;
            self.total_focus_minutes += f64::from(self.duration_seconds) / 60.0;
            self.display.render_stats(self.session_count, self.total_focus_minutes);
        }

        let message = self.mode.completion_message();
        info!(
            "{} interval completed: sessions={}, focus_minutes={}",
            self.mode, self.session_count, self.total_focus_minutes
        );
        self.display.celebrate();
        self.notifier.notify_completion(message);

        Completion {
            mode: self.mode,
            message: message.to_string(),
            session_count: self.session_count,
            total_focus_minutes: self.total_focus_minutes,
        }
    }

    fn render_focus_label(&mut self) {
        let mode = self.mode;
        let label = self.focus_label.as_deref().filter(|_| mode.is_focus());
        self.display.render_focus_label(label);
    }

    fn render_all(&mut self) {
        self.display.render(self.remaining_seconds, self.mode);
        self.display.render_stats(self.session_count, self.total_focus_minutes);
        self.render_focus_label();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{engine::DurationLimits, ticker::ManualTicker};

    #[derive(Debug, Default)]
    struct Screen {
        time: u32,
        mode: Option<TimerMode>,
        stats: (u32, f64),
        focus_label: Option<String>,
        celebrations: usize,
    }

    struct RecordingDisplay(Arc<Mutex<Screen>>);

    impl Display for RecordingDisplay {
        fn render(&mut self, remaining_seconds: u32, mode: TimerMode) {
            let mut screen = self.0.lock().unwrap();
            screen.time = remaining_seconds;
            screen.mode = Some(mode);
        }

        fn render_stats(&mut self, session_count: u32, total_focus_minutes: f64) {
            self.0.lock().unwrap().stats = (session_count, total_focus_minutes);
        }

        fn render_focus_label(&mut self, label: Option<&str>) {
            self.0.lock().unwrap().focus_label = label.map(str::to_string);
        }

        fn celebrate(&mut self) {
            self.0.lock().unwrap().celebrations += 1;
        }
    }

    struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

    impl Notifier for RecordingNotifier {
        fn notify_completion(&mut self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    struct Harness {
        engine: TimerEngine,
        screen: Arc<Mutex<Screen>>,
        messages: Arc<Mutex<Vec<String>>>,
        ticker: ManualTicker,
    }

    fn harness() -> Harness {
        harness_with(DurationSettings::default())
    }

    fn harness_with(durations: DurationSettings) -> Harness {
        let screen = Arc::new(Mutex::new(Screen::default()));
        let messages = Arc::new(Mutex::new(Vec::new()));
        let ticker = ManualTicker::new();
        let engine = TimerEngine::new(
            durations,
            Box::new(RecordingDisplay(Arc::clone(&screen))),
            Box::new(RecordingNotifier(Arc::clone(&messages))),
            Box::new(ticker.clone()),
        );
        Harness { engine, screen, messages, ticker }
    }

    fn skip() -> PromptOutcome {
        PromptOutcome::Skipped
    }

    #[test]
    fn starts_idle_with_focus_defaults() {
        let h = harness();
        assert_eq!(h.engine.mode(), TimerMode::Focus);
        assert!(!h.engine.is_running());
        assert_eq!(h.engine.duration_seconds(), 1500);
        assert_eq!(h.engine.remaining_seconds(), 1500);
        assert_eq!(h.screen.lock().unwrap().time, 1500);
    }

    #[test]
    fn start_then_pause_keeps_remaining() {
        let mut h = harness();
        assert!(h.engine.start(&mut skip()));
        assert!(h.engine.is_running());
        assert!(h.engine.pause());
        assert_eq!(h.engine.remaining_seconds(), 1500);
        assert!(!h.engine.is_running());
        assert!(!h.engine.pause());
    }

    #[test]
    fn start_twice_keeps_one_subscription() {
        let mut h = harness();
        h.engine.start(&mut skip());
        h.engine.start(&mut skip());
        assert_eq!(h.ticker.issued(), 1);
        assert_eq!(h.ticker.active_subscriptions(), 1);
    }

    #[test]
    fn ticks_count_down_only_while_running() {
        let mut h = harness();
        h.engine.tick();
        assert_eq!(h.engine.remaining_seconds(), 1500);

        h.engine.start(&mut skip());
        for _ in 0..10 {
            assert!(h.engine.tick().is_none());
        }
        assert_eq!(h.engine.remaining_seconds(), 1490);
        assert_eq!(h.screen.lock().unwrap().time, 1490);

        h.engine.pause();
        h.engine.tick();
        assert_eq!(h.engine.remaining_seconds(), 1490);
    }

    #[test]
    fn full_focus_interval_completes_once() {
        let mut h = harness();
        h.engine.start(&mut skip());

        let mut completions = Vec::new();
        for _ in 0..1500 {
            if let Some(done) = h.engine.tick() {
                completions.push(done);
            }
        }
        // Further ticks after completion are ignored
        for _ in 0..5 {
            assert!(h.engine.tick().is_none());
        }

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].message, "Focus session completed! Time for a break.");
        assert_eq!(h.engine.session_count(), 1);
        assert_eq!(h.engine.total_focus_minutes(), 25.0);
        assert_eq!(h.engine.remaining_seconds(), 0);
        assert!(!h.engine.is_running());
        assert_eq!(h.ticker.active_subscriptions(), 0);

        assert_eq!(
            *h.messages.lock().unwrap(),
            vec!["Focus session completed! Time for a break.".to_string()]
        );
        let screen = h.screen.lock().unwrap();
        assert_eq!(screen.stats, (1, 25.0));
        assert_eq!(screen.celebrations, 1);
    }

    #[test]
    fn break_completion_leaves_stats_alone() {
        let mut h = harness();
        h.engine.switch_mode(TimerMode::ShortBreak);
        h.engine.set_duration(TimerMode::ShortBreak, 1);
        h.engine.start(&mut skip());
        let done = (0..60).filter_map(|_| h.engine.tick()).last().unwrap();

        assert_eq!(done.mode, TimerMode::ShortBreak);
        assert_eq!(done.message, "Short break completed! Ready to focus?");
        assert_eq!(h.engine.session_count(), 0);
        assert_eq!(h.engine.total_focus_minutes(), 0.0);
        // No auto-advance
        assert_eq!(h.engine.mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn long_break_message() {
        let mut h = harness();
        h.engine.switch_mode(TimerMode::LongBreak);
        h.engine.set_duration(TimerMode::LongBreak, 1);
        h.engine.start(&mut skip());
        for _ in 0..60 {
            h.engine.tick();
        }
        assert_eq!(
            *h.messages.lock().unwrap(),
            vec!["Long break completed! Ready to focus?".to_string()]
        );
    }

    #[test]
    fn reset_always_rewinds_and_idles() {
        let mut h = harness();
        h.engine.start(&mut PromptOutcome::Confirmed("inbox zero".to_string()));
        for _ in 0..42 {
            h.engine.tick();
        }
        h.engine.reset();

        assert_eq!(h.engine.remaining_seconds(), h.engine.duration_seconds());
        assert!(!h.engine.is_running());
        assert_eq!(h.engine.focus_label(), None);
        assert_eq!(h.ticker.active_subscriptions(), 0);

        h.engine.reset();
        assert_eq!(h.engine.remaining_seconds(), 1500);
    }

    #[test]
    fn switch_mode_resets_and_clears_label_even_when_running() {
        let mut h = harness();
        h.engine.start(&mut PromptOutcome::Confirmed("draft".to_string()));
        assert_eq!(h.engine.focus_label(), Some("draft"));
        h.engine.tick();

        h.engine.switch_mode(TimerMode::LongBreak);
        assert_eq!(h.engine.mode(), TimerMode::LongBreak);
        assert_eq!(h.engine.duration_seconds(), 900);
        assert_eq!(h.engine.remaining_seconds(), 900);
        assert_eq!(h.engine.focus_label(), None);
        assert!(!h.engine.is_running());
        assert_eq!(h.ticker.active_subscriptions(), 0);

        let screen = h.screen.lock().unwrap();
        assert_eq!(screen.mode, Some(TimerMode::LongBreak));
        assert_eq!(screen.focus_label, None);
    }

    #[test]
    fn editing_other_mode_duration_leaves_timer_alone() {
        let mut h = harness();
        h.engine.switch_mode(TimerMode::ShortBreak);
        h.engine.start(&mut skip());
        h.engine.tick();

        assert_eq!(h.engine.set_duration(TimerMode::Focus, 50), 50);
        assert_eq!(h.engine.duration_seconds(), 300);
        assert_eq!(h.engine.remaining_seconds(), 299);
        assert!(h.engine.is_running());

        h.engine.switch_mode(TimerMode::Focus);
        assert_eq!(h.engine.duration_seconds(), 3000);
        assert_eq!(h.engine.remaining_seconds(), 3000);
    }

    #[test]
    fn editing_active_duration_discards_progress() {
        let mut h = harness();
        h.engine.start(&mut skip());
        for _ in 0..100 {
            h.engine.tick();
        }

        h.engine.set_duration(TimerMode::Focus, 30);
        assert_eq!(h.engine.duration_seconds(), 1800);
        assert_eq!(h.engine.remaining_seconds(), 1800);
        assert!(h.engine.is_running());
    }

    #[test]
    fn duration_is_clamped_not_rejected() {
        let mut h = harness();
        assert_eq!(h.engine.set_duration(TimerMode::Focus, 999), 60);
        assert_eq!(h.engine.durations().minutes(TimerMode::Focus), 60);
        assert_eq!(h.engine.set_duration(TimerMode::ShortBreak, -5), 1);
        assert_eq!(h.engine.set_duration(TimerMode::LongBreak, 31), 30);
    }

    #[test]
    fn duration_text_input() {
        let mut h = harness();
        assert_eq!(h.engine.set_duration_input(TimerMode::Focus, "45"), 45);
        assert_eq!(h.engine.set_duration_input(TimerMode::Focus, "abc"), 1);
        assert_eq!(h.engine.set_duration_input(TimerMode::ShortBreak, "7.8"), 7);
        assert_eq!(h.engine.set_duration_input(TimerMode::LongBreak, "1e9"), 30);
    }

    #[test]
    fn cancelled_prompt_does_not_start() {
        let mut h = harness();
        assert!(!h.engine.start(&mut PromptOutcome::Cancelled));
        assert!(!h.engine.is_running());
        assert_eq!(h.ticker.issued(), 0);
    }

    #[test]
    fn confirmed_empty_label_still_starts() {
        let mut h = harness();
        assert!(h.engine.start(&mut PromptOutcome::Confirmed("   ".to_string())));
        assert!(h.engine.is_running());
        assert_eq!(h.engine.focus_label(), None);
    }

    #[test]
    fn break_modes_never_prompt() {
        struct Panicking;
        impl FocusPrompt for Panicking {
            fn prompt_focus_label(&mut self) -> PromptOutcome {
                panic!("prompted outside focus mode");
            }
        }

        let mut h = harness();
        h.engine.switch_mode(TimerMode::ShortBreak);
        assert!(h.engine.start(&mut Panicking));
        assert!(!h.engine.set_focus_label(Some("ignored")));
        assert_eq!(h.engine.focus_label(), None);
    }

    #[test]
    fn focus_label_is_rendered() {
        let mut h = harness();
        h.engine.start(&mut PromptOutcome::Confirmed(" write tests ".to_string()));
        assert_eq!(h.screen.lock().unwrap().focus_label.as_deref(), Some("write tests"));

        assert!(h.engine.set_focus_label(None));
        assert_eq!(h.screen.lock().unwrap().focus_label, None);
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut h = harness();
        h.engine.start(&mut skip());
        let first = h.engine.subscription_id().unwrap();
        h.engine.pause();
        h.engine.start(&mut skip());
        let second = h.engine.subscription_id().unwrap();
        assert_ne!(first, second);

        h.engine.on_tick(first);
        assert_eq!(h.engine.remaining_seconds(), 1500);
        h.engine.on_tick(second);
        assert_eq!(h.engine.remaining_seconds(), 1499);
    }

    #[test]
    fn restart_after_completion_counts_again() {
        let mut h = harness_with(DurationSettings::new(
            (1, DurationLimits::focus_default()),
            (5, DurationLimits::break_default()),
            (15, DurationLimits::break_default()),
        ));
        h.engine.start(&mut skip());
        for _ in 0..60 {
            h.engine.tick();
        }
        assert_eq!(h.engine.remaining_seconds(), 0);

        h.engine.start(&mut skip());
        assert_eq!(h.engine.remaining_seconds(), 60);
        for _ in 0..60 {
            h.engine.tick();
        }
        assert_eq!(h.engine.session_count(), 2);
        assert_eq!(h.engine.total_focus_minutes(), 2.0);
    }
}
