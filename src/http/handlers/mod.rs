//! Request handlers, grouped by resource

pub mod assistant;
pub mod audio;
pub mod documents;
pub mod export;
pub mod meetings;

use super::state::AppState;
use crate::agenda::{split_agenda, AgendaSections};
use crate::openai::ApiError;
use crate::retry::RetryError;
use crate::session::MeetingId;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub transcription: &'static str,
    pub chat: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SplitAgendaRequest {
    pub content: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "meeting-assistant",
        transcription: state.transcriber.provider_name(),
        chat: state.chat.provider_name(),
    })
}

/// POST /agenda/split
pub async fn split_agenda_text(Json(req): Json<SplitAgendaRequest>) -> Json<AgendaSections> {
    Json(split_agenda(&req.content))
}

/// Append to the meeting's error log; a failing log write is only traced
pub(crate) async fn record_error(
    state: &AppState,
    id: &MeetingId,
    message: &str,
    context: Option<Value>,
) {
    if let Err(e) = state.store.log_error(id, message, context).await {
        warn!("Failed to write error log for {}: {}", id, e);
    }
}

/// Error log context for a failed upstream call
pub(crate) fn api_error_context(err: &RetryError<ApiError>) -> Value {
    let api = err.inner();
    let mut context = json!({ "status": api.status() });
    if let RetryError::RateLimitExhausted { attempts, .. } = err {
        context["attempts"] = json!(attempts);
    }
    if let Some(raw) = api.raw() {
        context["raw"] = json!(raw);
    }
    context
}
