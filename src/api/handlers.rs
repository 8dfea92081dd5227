//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::{engine::TimerMode, state::AppState};
use super::responses::{
    ApiResponse, DurationRequest, HealthResponse, LabelRequest, StartRequest, StatusResponse,
};

/// Parse an optional JSON body; an empty body means "all defaults"
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, StatusCode> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejecting malformed request body: {}", e);
        StatusCode::BAD_REQUEST
    })
}

fn parse_mode(raw: &str) -> Result<TimerMode, StatusCode> {
    raw.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })
}

fn internal_error(context: &str, e: String) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Handle POST /start - Start the countdown, answering the focus prompt
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    let request: StartRequest = parse_body(&body)?;
    let (started, timer) = state.start(request.into_outcome())
        .map_err(|e| internal_error("Failed to start timer", e))?;

    let message = if started {
        format!("Timer running in {} mode", timer.mode)
    } else {
        "Focus prompt cancelled, timer not started".to_string()
    };
    info!("Start endpoint called - {}", message);
    Ok(Json(ApiResponse::from_timer(message, timer)))
}

/// Handle POST /pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let (was_running, timer) = state.pause()
        .map_err(|e| internal_error("Failed to pause timer", e))?;

    let message = if was_running { "Timer paused" } else { "Timer was not running" };
    Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
}

/// Handle POST /reset - Rewind the current interval
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let timer = state.reset()
        .map_err(|e| internal_error("Failed to reset timer", e))?;
    Ok(Json(ApiResponse::from_timer("Timer reset".to_string(), timer)))
}

/// Handle POST /mode/:mode - Switch to another mode
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let mode = parse_mode(&mode)?;
    let timer = state.switch_mode(mode)
        .map_err(|e| internal_error("Failed to switch mode", e))?;

    info!("Mode endpoint called - switched to {}", mode);
    Ok(Json(ApiResponse::from_timer(format!("Switched to {}", mode.label()), timer)))
}

/// Handle PUT /duration/:mode - Configure a mode's duration (clamped)
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    let mode = parse_mode(&mode)?;
    let request: DurationRequest = parse_body(&body)?;
    let (minutes, timer) = state.set_duration(mode, &request.raw_minutes())
        .map_err(|e| internal_error("Failed to set duration", e))?;

    Ok(Json(ApiResponse::from_timer(
        format!("{} duration set to {} minutes", mode.label(), minutes),
        timer,
    )))
}

/// Handle PUT /label - Replace the focus label
pub async fn label_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    let request: LabelRequest = parse_body(&body)?;
    let (applied, timer) = state.set_focus_label(request.label.as_deref())
        .map_err(|e| internal_error("Failed to set focus label", e))?;

    let message = if applied { "Focus label updated" } else { "Focus label only applies in focus mode" };
    Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
}

/// Handle POST /notification/dismiss - Hide the completion banner
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let dismissed = state.dismiss_notification()
        .map_err(|e| internal_error("Failed to dismiss notification", e))?;
    let timer = state.get_engine_snapshot()
        .map_err(|e| internal_error("Failed to get timer state", e))?;

    let message = if dismissed { "Notification dismissed" } else { "No notification shown" };
    Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
}

/// Handle GET /status - Return timer, display and notification state
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state.get_engine_snapshot()
        .map_err(|e| internal_error("Failed to get timer state", e))?;
    let notification = state.get_banner()
        .map_err(|e| internal_error("Failed to get notification state", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        display: state.get_display(),
        notification,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
