use super::meeting_id::MeetingId;
use super::state::{MeetingState, WizardStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the meeting list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub id: MeetingId,

    pub created: DateTime<Utc>,

    /// Last write of the state file
    pub modified: DateTime<Utc>,

    pub current_step: WizardStep,
    pub has_transcript: bool,
    pub has_filled: bool,
    pub has_agenda: bool,
    pub has_audio: bool,
}

/// A stored audio upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFileInfo {
    pub path: String,
    pub filename: String,

    /// Size in bytes
    pub size: u64,

    pub mime: String,
    pub uploaded: DateTime<Utc>,
}

/// Everything needed to resume a meeting in the wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSnapshot {
    /// State with agenda, transcript and filled document read from their files
    #[serde(flatten)]
    pub state: MeetingState,

    /// Raw contents of the saved chat dialog, empty when none was saved
    pub chat_dialog: String,

    /// First stored audio file, if any
    pub uploaded: Option<AudioFileInfo>,
}
