use super::error::HttpError;
use crate::config::Config;
use crate::openai::{ChatCompletion, SpeechToText};
use crate::retry::RetryPolicy;
use crate::session::{AssistantSettings, MeetingId};
use crate::storage::MeetingStore;
use std::sync::Arc;

/// Server-wide defaults for transcription and template filling
#[derive(Debug, Clone)]
pub struct AssistantDefaults {
    pub retry: RetryPolicy,

    /// Transcription language when a request names none
    pub language: String,

    pub llm_model: String,
    pub llm_temperature: f32,
    pub system_prompt: String,
    pub task_prompt: String,
}

impl AssistantDefaults {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            retry: cfg.retry,
            language: cfg.transcription.language.clone(),
            llm_model: cfg.llm.model.clone(),
            llm_temperature: cfg.llm.temperature,
            system_prompt: cfg.llm.system_prompt.clone(),
            task_prompt: cfg.llm.task_prompt.clone(),
        }
    }

    /// Model: request override, then the meeting's setting, then the default
    pub fn model(&self, requested: Option<String>, settings: &AssistantSettings) -> String {
        requested
            .or_else(|| settings.llm_model.clone())
            .unwrap_or_else(|| self.llm_model.clone())
    }

    pub fn temperature(&self, requested: Option<f32>, settings: &AssistantSettings) -> f32 {
        requested
            .or(settings.llm_temperature)
            .unwrap_or(self.llm_temperature)
    }

    pub fn system_prompt(&self, requested: Option<String>, settings: &AssistantSettings) -> String {
        requested
            .filter(|p| !p.trim().is_empty())
            .or_else(|| settings.llm_system_prompt.clone())
            .unwrap_or_else(|| self.system_prompt.clone())
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MeetingStore>,
    pub transcriber: Arc<dyn SpeechToText>,
    pub chat: Arc<dyn ChatCompletion>,
    pub assistant: Arc<AssistantDefaults>,
}

impl AppState {
    pub fn new(
        store: MeetingStore,
        transcriber: Arc<dyn SpeechToText>,
        chat: Arc<dyn ChatCompletion>,
        assistant: AssistantDefaults,
    ) -> Self {
        Self {
            store: Arc::new(store),
            transcriber,
            chat,
            assistant: Arc::new(assistant),
        }
    }

    /// Parse a meeting id from the path and check the meeting exists
    pub async fn existing_meeting(&self, raw: &str) -> Result<MeetingId, HttpError> {
        let id = MeetingId::parse(raw)?;
        if !self.store.exists(&id).await {
            return Err(HttpError::not_found(format!("Meeting not found: {}", id)));
        }
        Ok(id)
    }
}
