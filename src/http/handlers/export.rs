use super::super::error::HttpError;
use super::super::state::AppState;
use crate::export::{attachment, content_disposition, render, zip_directory, ExportFormat};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    /// Download name without extension
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,

    /// Download name without extension
    pub filename: Option<String>,
}

/// GET /meetings/:meeting_id/export?format=md|json|doc&filename=
pub async fn export_filled(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;

    let format = match query.format.as_deref() {
        Some(raw) => raw
            .parse::<ExportFormat>()
            .map_err(|e| HttpError::bad_request(e.to_string()))?,
        None => ExportFormat::default(),
    };

    let filled = state
        .store
        .read_filled(&id)
        .await?
        .filter(|f| !f.is_empty())
        .ok_or_else(|| HttpError::not_found("No filled document"))?;

    let body = render(format, &filled).map_err(|e| HttpError::internal(e.to_string()))?;
    let name = query
        .filename
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("filled_{}", id));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&name, format)),
        ],
        body,
    ))
}

/// GET /meetings/:meeting_id/export/all?filename=
/// Everything stored for the meeting as one `.zip`
pub async fn export_all(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Query(query): Query<ArchiveQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;

    let archive = zip_directory(&state.store.meeting_dir(&id))
        .await
        .map_err(|e| HttpError::internal(format!("Cannot create ZIP file: {:#}", e)))?;
    info!("Exported {} as a {} byte archive", id, archive.len());

    let name = query
        .filename
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("motesdata_{}", Local::now().format("%Y-%m-%d")));

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&name, "zip")),
        ],
        archive,
    ))
}
