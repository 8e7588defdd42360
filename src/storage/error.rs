use crate::session::{InvalidMeetingId, MeetingId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidMeetingId(#[from] InvalidMeetingId),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Meeting not found: {0}")]
    MeetingNotFound(MeetingId),

    /// A per-meeting file (transcript, filled document, audio...) is missing
    #[error("{0}")]
    FileNotFound(String),

    #[error("A meeting named {0} already exists")]
    AlreadyExists(MeetingId),

    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid meeting state file for {meeting}: {source}")]
    CorruptState {
        meeting: MeetingId,
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Attach a description of the failed operation to I/O errors
pub(crate) trait IoContext<T> {
    fn io_context(self, context: impl FnOnce() -> String) -> StoreResult<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, context: impl FnOnce() -> String) -> StoreResult<T> {
        self.map_err(|source| StoreError::Io {
            context: context(),
            source,
        })
    }
}
