use super::super::error::HttpError;
use super::super::state::AppState;
use crate::agenda::{split_agenda, AgendaSections};
use crate::assist::ChatDialog;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DocumentBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct AgendaResponse {
    pub content: String,
    pub sections: AgendaSections,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub content: String,
}

/// GET /meetings/:meeting_id/agenda
pub async fn get_agenda(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<AgendaResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let content = state
        .store
        .read_agenda(&id)
        .await?
        .ok_or_else(|| HttpError::not_found("No agenda saved"))?;

    let sections = split_agenda(&content);
    Ok(Json(AgendaResponse { content, sections }))
}

/// PUT /meetings/:meeting_id/agenda
/// Save the agenda and return how it splits into agenda and template
pub async fn put_agenda(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(body): Json<DocumentBody>,
) -> Result<Json<AgendaResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    if body.content.trim().is_empty() {
        return Err(HttpError::bad_request("Agenda content required"));
    }

    state.store.save_agenda(&id, &body.content).await?;
    let sections = split_agenda(&body.content);
    Ok(Json(AgendaResponse {
        content: body.content,
        sections,
    }))
}

/// GET /meetings/:meeting_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<DocumentResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let content = state
        .store
        .read_transcript(&id)
        .await?
        .ok_or_else(|| HttpError::not_found("Transcript not found"))?;
    Ok(Json(DocumentResponse { content }))
}

/// PUT /meetings/:meeting_id/transcript
/// Manual edit; the previous transcript is kept as a version
pub async fn put_transcript(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(body): Json<DocumentBody>,
) -> Result<StatusCode, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    state.store.save_transcript(&id, &body.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /meetings/:meeting_id/chat
pub async fn get_chat(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<ChatDialog>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let raw = state.store.read_chat(&id).await?.unwrap_or_default();
    let dialog = ChatDialog::parse(&raw)
        .map_err(|e| HttpError::internal(format!("Stored chat dialog is invalid: {}", e)))?;
    Ok(Json(dialog))
}

/// PUT /meetings/:meeting_id/chat
pub async fn put_chat(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(dialog): Json<ChatDialog>,
) -> Result<StatusCode, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let json = dialog
        .to_json()
        .map_err(|e| HttpError::internal(e.to_string()))?;
    state.store.save_chat(&id, &json).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /meetings/:meeting_id/errors
pub async fn get_error_log(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let log = state
        .store
        .read_error_log(&id)
        .await?
        .ok_or_else(|| HttpError::not_found("No error log"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"error_log_{}.txt\"", id),
            ),
        ],
        log,
    ))
}
