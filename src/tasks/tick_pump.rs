//! Tick pump background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{state::AppState, ticker::Tick};

/// Background task that feeds ticks from the interval ticker into the engine
pub async fn tick_pump_task(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<Tick>) {
    info!("Starting tick pump task");

    while let Some(tick) = ticks.recv().await {
        match state.tick(tick.subscription) {
            Ok(Some(completion)) => {
                info!(
                    "Interval finished ({}): {}",
                    completion.mode, completion.message
                );
            }
            Ok(None) => {
                debug!("Tick {} applied", tick.subscription);
            }
            Err(e) => {
                error!("Failed to apply tick: {}", e);
            }
        }
    }

    info!("Tick channel closed, stopping tick pump");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display::WatchDisplay,
        engine::{DurationSettings, PromptOutcome, TimerEngine},
        notifier::{BannerBoard, ShellNotifier},
        ticker::{ManualTicker, Tick},
    };

    #[tokio::test]
    async fn forwards_ticks_until_channel_closes() {
        let (display, display_rx) = WatchDisplay::new();
        let banner = BannerBoard::default();
        let engine = TimerEngine::new(
            DurationSettings::default(),
            Box::new(display),
            Box::new(ShellNotifier::silent(banner.clone())),
            Box::new(ManualTicker::new()),
        );
        let state = Arc::new(AppState::new(engine, banner, display_rx, 0, "127.0.0.1".to_string()));
        state.start(PromptOutcome::Skipped).unwrap();
        let id = state.engine.lock().unwrap().subscription_id().unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..3 {
            tx.send(Tick { subscription: id }).unwrap();
        }
        // Stale subscription, must be ignored
        tx.send(Tick { subscription: id + 100 }).unwrap();
        drop(tx);

        tick_pump_task(Arc::clone(&state), rx).await;
        assert_eq!(state.get_engine_snapshot().unwrap().remaining_seconds, 1497);
    }
}
