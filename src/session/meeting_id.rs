use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid meeting id {0:?}: use only letters, digits, dashes and underscores")]
pub struct InvalidMeetingId(pub String);

/// Identifier of a meeting, also its directory name on disk.
///
/// Restricted to `[A-Za-z0-9_-]`, so it can never escape the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeetingId(String);

impl MeetingId {
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidMeetingId> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= MAX_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(Self(value))
        } else {
            Err(InvalidMeetingId(value))
        }
    }

    /// `meeting_<YYYYMMDD_HHMMSS>_<6 hex>`
    pub fn generate() -> Self {
        Self(format!(
            "meeting_{}_{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            short_hex()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Six random hex characters
pub(crate) fn short_hex() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_string()
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MeetingId {
    type Err = InvalidMeetingId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MeetingId {
    type Error = InvalidMeetingId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MeetingId> for String {
    fn from(id: MeetingId) -> Self {
        id.0
    }
}

impl AsRef<str> for MeetingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
