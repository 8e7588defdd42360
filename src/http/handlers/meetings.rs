use super::super::error::HttpError;
use super::super::state::AppState;
use crate::session::{MeetingId, MeetingSnapshot, MeetingState, MeetingSummary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct MeetingListResponse {
    pub meetings: Vec<MeetingSummary>,
}

#[derive(Debug, Serialize)]
pub struct CreateMeetingResponse {
    pub meeting_id: MeetingId,
    pub state: MeetingState,
}

#[derive(Debug, Deserialize)]
pub struct RenameMeetingRequest {
    pub new_meeting_id: String,
}

#[derive(Debug, Serialize)]
pub struct RenameMeetingResponse {
    pub old_meeting_id: MeetingId,
    pub new_meeting_id: MeetingId,
}

/// GET /meetings
pub async fn list_meetings(
    State(state): State<AppState>,
) -> Result<Json<MeetingListResponse>, HttpError> {
    let meetings = state.store.list_meetings().await?;
    Ok(Json(MeetingListResponse { meetings }))
}

/// POST /meetings
pub async fn create_meeting(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateMeetingResponse>), HttpError> {
    let meeting = state.store.create_meeting().await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateMeetingResponse {
            meeting_id: meeting.meeting_id.clone(),
            state: meeting,
        }),
    ))
}

/// GET /meetings/:meeting_id
/// Saved state merged with the meeting's documents, for resuming the wizard
pub async fn load_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<MeetingSnapshot>, HttpError> {
    let id = MeetingId::parse(meeting_id)?;
    Ok(Json(state.store.load_meeting(&id).await?))
}

/// POST /meetings/:meeting_id/rename
pub async fn rename_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(req): Json<RenameMeetingRequest>,
) -> Result<Json<RenameMeetingResponse>, HttpError> {
    let old = MeetingId::parse(meeting_id)?;
    let new = MeetingId::parse(req.new_meeting_id.trim())?;

    if old == new {
        return Err(HttpError::bad_request("New meeting id equals the current one"));
    }

    state.store.rename_meeting(&old, &new).await?;
    info!("Meeting {} renamed to {}", old, new);

    Ok(Json(RenameMeetingResponse {
        old_meeting_id: old,
        new_meeting_id: new,
    }))
}

/// GET /meetings/:meeting_id/state
pub async fn get_state(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<MeetingState>, HttpError> {
    let id = MeetingId::parse(meeting_id)?;
    Ok(Json(state.store.load_state(&id).await?))
}

/// PUT /meetings/:meeting_id/state
/// Replace the session state; the meeting directory is created if needed
pub async fn put_state(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(meeting): Json<MeetingState>,
) -> Result<Json<MeetingState>, HttpError> {
    let id = MeetingId::parse(meeting_id)?;
    if meeting.meeting_id != id {
        return Err(HttpError::bad_request(format!(
            "State belongs to meeting {}, not {}",
            meeting.meeting_id, id
        )));
    }

    Ok(Json(state.store.save_state(&id, meeting).await?))
}
