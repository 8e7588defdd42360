use super::messages::{ChatCompletionRequest, ChatCompletionResponse, TranscriptionResponse};
use super::provider::{ApiError, ChatCompletion, ChatRequest, SpeechToText, TranscriptionRequest};
use crate::audio::mime_for_path;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL without the `/v1/...` path, e.g. "https://api.openai.com"
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: 300,
            connect_timeout_secs: 30,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build_client(&self) -> Result<Client, ApiError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .build()?)
    }
}

/// Whisper-style transcription over `POST /v1/audio/transcriptions`
pub struct OpenAiTranscriber {
    endpoint: EndpointConfig,
    model: String,
    client: Client,
}

impl OpenAiTranscriber {
    pub fn new(endpoint: EndpointConfig, model: impl Into<String>) -> Result<Self, ApiError> {
        let client = endpoint.build_client()?;
        Ok(Self {
            endpoint,
            model: model.into(),
            client,
        })
    }
}

#[async_trait]
impl SpeechToText for OpenAiTranscriber {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, ApiError> {
        let path = &request.audio_path;
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Audio {
            path: path.clone(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        info!(
            "Transcribing {} ({} bytes, language={}, model={})",
            file_name,
            bytes.len(),
            request.language,
            self.model
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for_path(path))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", request.language.clone());

        let response = self
            .client
            .post(self.endpoint.url("/v1/audio/transcriptions"))
            .bearer_auth(&self.endpoint.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        debug!("Transcription API status {}", status);

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), raw));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&raw)
            .map_err(|_| ApiError::InvalidResponse { raw: raw.clone() })?;

        match parsed.text {
            Some(text) if !text.is_empty() => {
                info!("Transcription successful, length: {}", text.len());
                Ok(text)
            }
            _ => Err(ApiError::EmptyTranscript),
        }
    }
}

/// Chat completion over `POST /v1/chat/completions`
pub struct OpenAiChat {
    endpoint: EndpointConfig,
    client: Client,
}

impl OpenAiChat {
    pub fn new(endpoint: EndpointConfig) -> Result<Self, ApiError> {
        let client = endpoint.build_client()?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ApiError> {
        info!(
            "Chat completion: model={}, temperature={}, {} messages",
            request.model,
            request.temperature,
            request.messages.len()
        );

        let body = ChatCompletionRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: &request.messages,
        };

        let response = self
            .client
            .post(self.endpoint.url("/v1/chat/completions"))
            .bearer_auth(&self.endpoint.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), raw));
        }

        let content = serde_json::from_str::<ChatCompletionResponse>(&raw)
            .ok()
            .and_then(ChatCompletionResponse::into_content);

        match content {
            Some(content) => Ok(content),
            None => Err(ApiError::InvalidResponse { raw }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let endpoint = EndpointConfig::new("https://api.example.com/", "key");
        assert_eq!(
            endpoint.url("/v1/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
