//! Meeting session model
//!
//! A meeting's state is an explicit value ([`MeetingState`]) that is loaded,
//! changed and saved by whoever handles a request; nothing is held in
//! ambient shared state between requests.

mod meeting_id;
mod state;
mod summary;

pub(crate) use meeting_id::short_hex;
pub use meeting_id::{InvalidMeetingId, MeetingId};
pub use state::{AssistantSettings, MeetingState, WizardStep};
pub use summary::{AudioFileInfo, MeetingSnapshot, MeetingSummary};
