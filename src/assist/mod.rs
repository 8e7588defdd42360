//! Template filling with a language model
//!
//! Builds the chat-completion conversations for the one-shot fill and for
//! the refinement chat, and models the stored chat dialog.

mod dialog;
mod prompt;

pub use dialog::ChatDialog;
pub use prompt::{
    conversation_messages, extract_template, fill_messages, TEMPLATE_HEADER, TEMPLATE_UPDATED,
    TRANSCRIPT_HEADER,
};
