use crate::openai::ChatMessage;
use serde::{Deserialize, Serialize};

/// The refinement chat of one meeting, persisted as `chat_dialog.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDialog {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatDialog {
    /// Parse stored dialog JSON; empty input is an empty dialog
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Record one finished round: the instruction and the assistant's note
    pub fn record_round(&mut self, instruction: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(ChatMessage::user(instruction));
        self.messages.push(ChatMessage::assistant(reply));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
