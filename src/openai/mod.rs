//! Speech-to-text and chat-completion collaborators
//!
//! Both backends speak the OpenAI-compatible wire format. Mock
//! implementations stand in when no API key is configured or mock mode is on.

pub mod client;
pub mod messages;
pub mod mock;
pub mod provider;

pub use client::{EndpointConfig, OpenAiChat, OpenAiTranscriber};
pub use messages::{ChatMessage, ChatRole};
pub use mock::{MockChat, MockTranscriber};
pub use provider::{
    ApiError, ChatCompletion, ChatRequest, SpeechToText, TranscriptionRequest,
    SUPPORTED_FORMATS_LABEL,
};

use crate::config::Config;
use std::sync::Arc;
use tracing::info;

/// Create the transcription and chat backends described by `cfg`
pub fn build_providers(
    cfg: &Config,
) -> Result<(Arc<dyn SpeechToText>, Arc<dyn ChatCompletion>), ApiError> {
    let transcriber: Arc<dyn SpeechToText> = match cfg.transcription.api_key.as_deref() {
        Some(key) if !cfg.mock_mode && !key.is_empty() => Arc::new(OpenAiTranscriber::new(
            EndpointConfig::new(&cfg.transcription.base_url, key),
            &cfg.transcription.model,
        )?),
        _ => {
            info!("Transcription running in mock mode");
            Arc::new(MockTranscriber)
        }
    };

    let chat: Arc<dyn ChatCompletion> = match cfg.llm.api_key.as_deref() {
        Some(key) if !cfg.mock_mode && !key.is_empty() => Arc::new(OpenAiChat::new(
            EndpointConfig::new(&cfg.llm.base_url, key),
        )?),
        _ => {
            info!("Chat completion running in mock mode");
            Arc::new(MockChat)
        }
    };

    Ok((transcriber, chat))
}
