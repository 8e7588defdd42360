use crate::openai::ChatMessage;

/// Marks the start of the template in a user message
pub const TEMPLATE_HEADER: &str = "MALL:";

/// Marks the start of the transcript in a user message
pub const TRANSCRIPT_HEADER: &str = "TRANSKRIPT:";

const CONVERSATION_INSTRUCTION: &str = "VIKTIGT: Fyll i mallen baserat på transkriptet och \
instruktionerna som följer. Svara ALLTID med den ifyllda mallen som innehåller konkret \
information från mötet.";

/// Reply recorded in the dialog after the template was refilled
pub const TEMPLATE_UPDATED: &str = "Mall uppdaterad";

/// Messages for a one-shot template fill
pub fn fill_messages(
    system_prompt: &str,
    task_prompt: &str,
    template: &str,
    transcript: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(format!(
            "{}\n\n{}\n{}\n\n{}\n{}",
            task_prompt, TEMPLATE_HEADER, template, TRANSCRIPT_HEADER, transcript
        )),
    ]
}

/// Messages for one round of the refinement chat.
///
/// System prompt, then the template and transcript as context, then the
/// stored dialog, then the new instruction.
pub fn conversation_messages(
    system_prompt: &str,
    template: &str,
    transcript: &str,
    history: &[ChatMessage],
    instruction: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(system_prompt));
    messages.push(ChatMessage::user(format!(
        "{}\n{}\n\n{}\n{}\n\n{}",
        TEMPLATE_HEADER, template, TRANSCRIPT_HEADER, transcript, CONVERSATION_INSTRUCTION
    )));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(instruction));
    messages
}

/// Template text embedded in a message built by this module
pub fn extract_template(content: &str) -> Option<&str> {
    let start = content.find(TEMPLATE_HEADER)? + TEMPLATE_HEADER.len();
    let rest = content[start..].strip_prefix('\n').unwrap_or(&content[start..]);
    let end = rest
        .find(&format!("\n\n{}", TRANSCRIPT_HEADER))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
