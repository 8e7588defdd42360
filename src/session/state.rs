use super::meeting_id::MeetingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard steps, in the order a meeting moves through them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Agenda,
    Record,
    Transcribe,
    Template,
    Export,
}

impl WizardStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Agenda => "agenda",
            WizardStep::Record => "record",
            WizardStep::Transcribe => "transcribe",
            WizardStep::Template => "template",
            WizardStep::Export => "export",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-meeting overrides of the language-model settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_system_prompt: Option<String>,
}

/// The session value for one meeting.
///
/// Persisted as `meeting_state.json`. Handlers load it, change the fields
/// they own and write it back; the last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingState {
    pub meeting_id: MeetingId,

    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,

    #[serde(default)]
    pub current_step: WizardStep,

    #[serde(default)]
    pub agenda: String,

    #[serde(default)]
    pub transcript: String,

    #[serde(default)]
    pub filled: String,

    #[serde(default)]
    pub settings: AssistantSettings,

    /// Client-side timestamp of the state being saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,

    /// Previous id, set when the meeting was renamed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_meeting_id: Option<MeetingId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed: Option<DateTime<Utc>>,
}

impl MeetingState {
    pub fn new(meeting_id: MeetingId) -> Self {
        Self {
            meeting_id,
            created: Utc::now(),
            current_step: WizardStep::default(),
            agenda: String::new(),
            transcript: String::new(),
            filled: String::new(),
            settings: AssistantSettings::default(),
            timestamp: None,
            last_saved: None,
            old_meeting_id: None,
            renamed: None,
        }
    }
}
