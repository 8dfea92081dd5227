//! Pomodoro Timer - focus/break countdown served over a local HTTP API
//!
//! This is the main entry point for the pomodoro-timer application.

use std::sync::Arc;
use anyhow::anyhow;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::tick_pump_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, focus={}min, short={}min, long={}min",
          config.host, config.port, config.focus, config.short_break, config.long_break);

    // Create application state with the single timer engine
    let (state, tick_rx) = AppState::from_config(&config).map_err(|e| anyhow!(e))?;
    let state = Arc::new(state);

    // Ask for desktop notification permission once, off the executor
    let permission_state = Arc::clone(&state);
    tokio::task::spawn_blocking(move || permission_state.request_notification_permission())
        .await?
        .map_err(|e| anyhow!(e))?;

    // Start the tick pump background task
    let pump_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_pump_task(pump_state, tick_rx).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                 - Start (body: {{\"label\": .., \"cancelled\": ..}})");
    info!("  POST /pause                 - Pause the countdown");
    info!("  POST /reset                 - Rewind the current interval");
    info!("  POST /mode/:mode            - Switch to focus, short-break or long-break");
    info!("  PUT  /duration/:mode        - Set a mode's minutes (body: {{\"minutes\": ..}})");
    info!("  PUT  /label                 - Set the focus label");
    info!("  POST /notification/dismiss  - Hide the completion banner");
    info!("  GET  /status                - Timer, display and notification state");
    info!("  GET  /health                - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
