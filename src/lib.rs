pub mod agenda;
pub mod assist;
pub mod audio;
pub mod config;
pub mod export;
pub mod http;
pub mod openai;
pub mod retry;
pub mod session;
pub mod storage;

pub use agenda::{split_agenda, AgendaSections};
pub use config::Config;
pub use export::ExportFormat;
pub use http::{create_router, AppState, AssistantDefaults};
pub use openai::{build_providers, ApiError, ChatCompletion, SpeechToText};
pub use retry::{with_backoff, RetryError, RetryPolicy};
pub use session::{MeetingId, MeetingState, WizardStep};
pub use storage::{MeetingStore, StoreError};
