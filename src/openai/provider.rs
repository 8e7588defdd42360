use super::messages::{ApiErrorBody, ChatMessage};
use crate::retry::{message_signals_rate_limit, RateLimited};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Audio formats accepted by the transcription API, as shown to users
pub const SUPPORTED_FORMATS_LABEL: &str = "FLAC, M4A, MP3, MP4, MPEG, MPGA, OGA, OGG, WAV, WebM";

/// Failure talking to a transcription or chat-completion API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429 from the upstream API
    #[error("Rate limit reached, try again in a few minutes (status: 429){}", detail_suffix(.message))]
    RateLimited { message: Option<String>, raw: String },

    /// Any other non-2xx upstream status
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        raw: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API response")]
    InvalidResponse { raw: String },

    #[error("Empty transcription result")]
    EmptyTranscript,

    #[error("Failed to read audio file {}: {source}", .path.display())]
    Audio {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn detail_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" - {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// Build the error for a non-2xx response
    pub fn from_status(status: u16, raw: String) -> Self {
        let message = ApiErrorBody::message_from(&raw);

        if status == 429 {
            return ApiError::RateLimited { message, raw };
        }

        let message = match message {
            Some(m) if m.contains("Invalid file format") || m.contains("Unsupported file format") => {
                format!("Invalid file format. Supported formats: {}", SUPPORTED_FORMATS_LABEL)
            }
            Some(m) => m,
            None => format!("API error (status: {})", status),
        };

        ApiError::Status {
            status,
            message,
            raw,
        }
    }

    /// Upstream HTTP status, when the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw upstream body, when one was received
    pub fn raw(&self) -> Option<&str> {
        match self {
            ApiError::RateLimited { raw, .. }
            | ApiError::Status { raw, .. }
            | ApiError::InvalidResponse { raw } => Some(raw),
            _ => None,
        }
    }
}

impl RateLimited for ApiError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. }) || message_signals_rate_limit(&self.to_string())
    }
}

/// Audio file plus language hint for a transcription call
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,

    /// ISO 639-1 language code, e.g. "sv"
    pub language: String,
}

/// A chat-completion call
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// Speech-to-text backend
#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Transcribe one audio file, returning the transcript text
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, ApiError>;
}

/// Chat-completion backend
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Whether a refinement reply is a revised document that replaces the
    /// filled one
    fn revises_document(&self) -> bool {
        true
    }

    /// Run the conversation, returning the assistant reply
    async fn complete(&self, request: &ChatRequest) -> Result<String, ApiError>;
}
