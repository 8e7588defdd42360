use super::super::error::HttpError;
use super::super::state::AppState;
use super::{api_error_context, record_error};
use crate::agenda::split_agenda;
use crate::assist::{conversation_messages, fill_messages, ChatDialog, TEMPLATE_UPDATED};
use crate::audio::{normalize_container, validate_transcribable};
use crate::openai::{ChatRequest, TranscriptionRequest};
use crate::retry::with_backoff;
use crate::session::MeetingId;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    /// Stored audio file name, as listed by GET /meetings/:id/audio
    pub filename: String,

    pub language: Option<String>,

    /// Keep the existing transcript and add this one after a separator
    #[serde(default)]
    pub append: bool,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    /// The full transcript after this call
    pub transcript: String,

    /// Text produced by this call alone
    pub text: String,
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FillRequest {
    /// Template to fill; defaults to the template section of the agenda
    pub template_markdown: Option<String>,
    pub system_prompt: Option<String>,
    pub task_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct FillResponse {
    pub filled_markdown: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,

    /// The new filled document, or `None` when the reply is not a document
    pub filled_template: Option<String>,
    pub dialog: ChatDialog,
}

/// POST /meetings/:meeting_id/transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(req): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let stored = state.store.audio_path(&id, &req.filename).await?;

    let audio_path = match normalize_container(&stored).await {
        Ok(path) => path,
        Err(e) => {
            let message = format!("Could not prepare {}: {:#}", req.filename, e);
            record_error(&state, &id, &message, None).await;
            return Err(HttpError::internal(message));
        }
    };

    if let Err(message) = validate_transcribable(&audio_path) {
        record_error(
            &state,
            &id,
            &message,
            Some(json!({ "file": audio_path.display().to_string() })),
        )
        .await;
        return Err(HttpError::bad_request(message));
    }

    // Name of the file as stored now, after any container rename
    let filename = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| req.filename.clone());

    let request = TranscriptionRequest {
        audio_path,
        language: req
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| state.assistant.language.clone()),
    };
    info!(
        "Transcribing {} for {} (language={}, provider={})",
        filename,
        id,
        request.language,
        state.transcriber.provider_name()
    );

    let (transcriber, request) = (&state.transcriber, &request);
    let attempt = move || transcriber.transcribe(request);
    let text = match with_backoff(state.assistant.retry, attempt).await {
        Ok(text) => text,
        Err(e) => {
            record_error(
                &state,
                &id,
                &format!("Transcription failed: {}", e),
                Some(api_error_context(&e)),
            )
            .await;
            return Err(e.into());
        }
    };

    let transcript = state
        .store
        .record_transcription(&id, &filename, &text, req.append)
        .await?;

    Ok(Json(TranscribeResponse {
        transcript,
        text,
        filename,
    }))
}

/// POST /meetings/:meeting_id/fill
/// Fill the template from the transcript and save the result
pub async fn fill_template(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(req): Json<FillRequest>,
) -> Result<Json<FillResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    let settings = state.store.load_state(&id).await?.settings;

    let template = match req.template_markdown.filter(|t| !t.trim().is_empty()) {
        Some(template) => template,
        None => agenda_template(&state, &id).await?,
    };
    if template.trim().is_empty() {
        return Err(HttpError::bad_request("A template is required to fill"));
    }

    let transcript = state.store.read_transcript(&id).await?.unwrap_or_default();
    let defaults = &state.assistant;
    let system_prompt = defaults.system_prompt(req.system_prompt, &settings);
    let task_prompt = req
        .task_prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| defaults.task_prompt.clone());

    let request = ChatRequest {
        model: defaults.model(req.model, &settings),
        temperature: defaults.temperature(req.temperature, &settings),
        messages: fill_messages(&system_prompt, &task_prompt, &template, &transcript),
    };
    info!(
        "Filling template for {} (model={}, provider={})",
        id,
        request.model,
        state.chat.provider_name()
    );

    let (chat, request) = (&state.chat, &request);
    let filled = match with_backoff(defaults.retry, move || chat.complete(request)).await {
        Ok(filled) => filled,
        Err(e) => {
            record_error(
                &state,
                &id,
                &format!("Template fill failed: {}", e),
                Some(api_error_context(&e)),
            )
            .await;
            return Err(e.into());
        }
    };

    state.store.save_filled(&id, &filled).await?;
    Ok(Json(FillResponse {
        filled_markdown: filled,
    }))
}

/// POST /meetings/:meeting_id/chat
/// One refinement round: a revised document replaces the filled one
pub async fn chat(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
    Json(req): Json<ChatRequestBody>,
) -> Result<Json<ChatResponse>, HttpError> {
    let id = state.existing_meeting(&meeting_id).await?;
    if req.message.trim().is_empty() {
        return Err(HttpError::bad_request("Message required"));
    }

    let template = agenda_template(&state, &id).await?;
    if template.trim().is_empty() {
        return Err(HttpError::bad_request(
            "The agenda has no template section to refine",
        ));
    }
    let transcript = state
        .store
        .read_transcript(&id)
        .await?
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| HttpError::bad_request("Transcribe the meeting before chatting"))?;

    let settings = state.store.load_state(&id).await?.settings;
    let stored = state.store.read_chat(&id).await?.unwrap_or_default();
    let mut dialog = ChatDialog::parse(&stored)
        .map_err(|e| HttpError::internal(format!("Stored chat dialog is invalid: {}", e)))?;

    let defaults = &state.assistant;
    let system_prompt = defaults.system_prompt(None, &settings);
    let request = ChatRequest {
        model: defaults.model(req.model, &settings),
        temperature: defaults.temperature(req.temperature, &settings),
        messages: conversation_messages(
            &system_prompt,
            &template,
            &transcript,
            &dialog.messages,
            &req.message,
        ),
    };

    let (chat, request) = (&state.chat, &request);
    let reply = match with_backoff(defaults.retry, move || chat.complete(request)).await {
        Ok(reply) => reply,
        Err(e) => {
            record_error(
                &state,
                &id,
                &format!("Chat failed: {}", e),
                Some(api_error_context(&e)),
            )
            .await;
            return Err(e.into());
        }
    };

    let filled_template = if state.chat.revises_document() {
        state.store.save_filled(&id, &reply).await?;
        dialog.record_round(req.message, TEMPLATE_UPDATED);
        Some(reply.clone())
    } else {
        dialog.record_round(req.message, reply.clone());
        None
    };

    let json = dialog
        .to_json()
        .map_err(|e| HttpError::internal(e.to_string()))?;
    state.store.save_chat(&id, &json).await?;

    Ok(Json(ChatResponse {
        response: reply,
        filled_template,
        dialog,
    }))
}

/// Template section of the saved agenda, empty when there is none
async fn agenda_template(state: &AppState, id: &MeetingId) -> Result<String, HttpError> {
    let agenda = state.store.read_agenda(id).await?.unwrap_or_default();
    Ok(split_agenda(&agenda).second_section)
}
