//! Per-meeting file storage

mod error;
mod store;

pub use error::{StoreError, StoreResult};
pub use store::MeetingStore;
