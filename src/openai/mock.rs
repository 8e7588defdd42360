use super::provider::{ApiError, ChatCompletion, ChatRequest, SpeechToText, TranscriptionRequest};
use crate::assist::extract_template;
use async_trait::async_trait;
use tracing::info;

pub const MOCK_TRANSCRIPT: &str = "Detta är ett EXEMPELTRANSKRIPT (mock) på svenska. \
Här nämns beslut, åtgärder och nästa steg.";

pub const MOCK_CHAT_REPLY: &str = "Detta är ett mock-svar från LLM. I verkligheten skulle jag \
hjälpa dig att fylla i mallen baserat på transkriptet.";

/// Template sections the mock completion fills, with their demo body
const MOCK_SECTIONS: [(&str, &str); 5] = [
    ("## Sammanfattning", "- Sammanfattning (mock) baserad på transkript"),
    ("## Beslut", "- Beslut: Demo-beslut"),
    ("## Åtgärder", "- [ ] Demo-åtgärd; Ansvarig: Anna; Deadline: 2025-09-01"),
    ("## Risker", "- Demo-risk"),
    ("## Nästa steg", "- Boka uppföljning (demo)"),
];

/// Offline transcription that always returns [`MOCK_TRANSCRIPT`]
#[derive(Debug, Default)]
pub struct MockTranscriber;

#[async_trait]
impl SpeechToText for MockTranscriber {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<String, ApiError> {
        info!("Using mock transcription for {}", request.audio_path.display());
        Ok(MOCK_TRANSCRIPT.to_string())
    }
}

/// Offline chat completion.
///
/// When the last message carries a template, the known sections of the
/// template are filled with demo content. A plain instruction gets
/// [`MOCK_CHAT_REPLY`], which is not a document.
#[derive(Debug, Default)]
pub struct MockChat;

#[async_trait]
impl ChatCompletion for MockChat {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn revises_document(&self) -> bool {
        false
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let template = request
            .messages
            .last()
            .and_then(|message| extract_template(&message.content));

        Ok(match template {
            Some(template) => fill_template_mock(template),
            None => MOCK_CHAT_REPLY.to_string(),
        })
    }
}

/// Replace the body of each known `##` section with its demo content
pub fn fill_template_mock(template: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in template.split('\n') {
        if line.starts_with("## ") {
            skipping = false;
        } else if skipping {
            continue;
        }

        out.push(line);

        if let Some((_, body)) = MOCK_SECTIONS
            .iter()
            .find(|(heading, _)| line.trim_end() == *heading)
        {
            out.push(*body);
            skipping = true;
        }
    }

    out.join("\n")
}
