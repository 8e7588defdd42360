//! Uploaded audio: container fixes and transcription format checks

pub mod format;

pub use format::{
    extension_for_upload, extension_of, mime_for_path, normalize_container, suggest_conversion,
    validate_transcribable, TRANSCRIBABLE_EXTENSIONS,
};
