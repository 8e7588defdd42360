use super::super::error::HttpError;
use super::super::state::AppState;
use super::record_error;
use crate::audio::mime_for_path;
use crate::session::AudioFileInfo;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

/// Multipart field carrying the uploaded audio
const AUDIO_FIELD: &str = "audio";

#[derive(Debug, Serialize)]
pub struct AudioListResponse {
    pub files: Vec<AudioFileInfo>,
}

/// POST /meetings/:meeting_id/audio
/// Store the multipart `audio` field as a new recording
pub async fn upload_audio(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AudioFileInfo>), HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(HttpError::from_multipart)?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let mime = field.content_type().unwrap_or_default().to_string();
        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(HttpError::from_multipart)?;

        if data.is_empty() {
            return Err(HttpError::bad_request("Uploaded audio is empty"));
        }

        return match state
            .store
            .store_audio(&id, &data, &mime, &original_name)
            .await
        {
            Ok(file) => Ok((StatusCode::CREATED, Json(file))),
            Err(e) => {
                record_error(
                    &state,
                    &id,
                    &format!("Upload failed: {}", e),
                    Some(json!({ "mime": mime, "original_name": original_name })),
                )
                .await;
                Err(e.into())
            }
        };
    }

    Err(HttpError::bad_request("Multipart field \"audio\" required"))
}

/// GET /meetings/:meeting_id/audio
pub async fn list_audio(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> Result<Json<AudioListResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let files = state.store.list_audio_files(&id).await?;
    Ok(Json(AudioListResponse { files }))
}

/// GET /meetings/:meeting_id/audio/:filename
pub async fn download_audio(
    State(state): State<AppState>,
    Path((meeting_id, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let path = state.store.audio_path(&id, &filename).await?;

    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| HttpError::internal(format!("Failed to read {}: {}", filename, e)))?;
    info!("Serving {} ({} bytes) for {}", filename, data.len(), id);

    Ok((
        [
            (header::CONTENT_TYPE, mime_for_path(&path).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}
