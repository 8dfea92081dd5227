//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    display::DisplaySnapshot,
    engine::{EngineSnapshot, PromptOutcome},
    notifier::Banner,
};

/// Body of `POST /start`; answers the focus label prompt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    pub label: Option<String>,
    pub cancelled: bool,
}

impl StartRequest {
    pub fn into_outcome(self) -> PromptOutcome {
        if self.cancelled {
            PromptOutcome::Cancelled
        } else {
            match self.label {
                Some(label) => PromptOutcome::Confirmed(label),
                None => PromptOutcome::Skipped,
            }
        }
    }
}

/// Body of `PUT /duration/:mode`. Minutes may be a number or a string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DurationRequest {
    pub minutes: serde_json::Value,
}

impl DurationRequest {
    /// Raw text handed to the engine's lenient minute parser
    pub fn raw_minutes(&self) -> String {
        match &self.minutes {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Number(number) => number.to_string(),
            _ => String::new(),
        }
    }
}

/// Body of `PUT /label`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelRequest {
    pub label: Option<String>,
}

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: EngineSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: EngineSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Status derived from whether the timer is counting down
    pub fn from_timer(message: String, timer: EngineSnapshot) -> Self {
        let status = if timer.running { "running" } else { "idle" };
        Self::new(status.to_string(), message, timer)
    }
}

/// Full status, including what the display currently shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: EngineSnapshot,
    pub display: DisplaySnapshot,
    pub notification: Option<Banner>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_maps_to_prompt_outcome() {
        let empty: StartRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.into_outcome(), PromptOutcome::Skipped);

        let labelled: StartRequest = serde_json::from_str(r#"{"label":"essay"}"#).unwrap();
        assert_eq!(labelled.into_outcome(), PromptOutcome::Confirmed("essay".to_string()));

        let cancelled: StartRequest =
            serde_json::from_str(r#"{"label":"essay","cancelled":true}"#).unwrap();
        assert_eq!(cancelled.into_outcome(), PromptOutcome::Cancelled);
    }

    #[test]
    fn duration_request_accepts_numbers_and_text() {
        let number: DurationRequest = serde_json::from_str(r#"{"minutes":40}"#).unwrap();
        assert_eq!(number.raw_minutes(), "40");

        let text: DurationRequest = serde_json::from_str(r#"{"minutes":"12"}"#).unwrap();
        assert_eq!(text.raw_minutes(), "12");

        let junk: DurationRequest = serde_json::from_str(r#"{"minutes":[1]}"#).unwrap();
        assert_eq!(junk.raw_minutes(), "");

        assert_eq!(DurationRequest::default().raw_minutes(), "");
    }
}
