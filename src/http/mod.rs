//! HTTP API for the meeting wizard
//!
//! - /meetings: create, list, load, rename and save session state
//! - /meetings/:id/{agenda,transcript,chat}: documents of one meeting
//! - /meetings/:id/audio: upload, list and download recordings
//! - /meetings/:id/{transcribe,fill,chat}: calls to the speech-to-text and
//!   chat-completion providers, wrapped in rate-limit backoff
//! - /meetings/:id/export: filled document as Markdown, JSON or Word
//! - /health, /agenda/split

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ErrorResponse, HttpError};
pub use routes::create_router;
pub use state::{AppState, AssistantDefaults};
