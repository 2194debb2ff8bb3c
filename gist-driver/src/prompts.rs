//! Conversation assembly for the two request kinds.

use gist_types::{Profile, PromptMessage};

/// System prompt for page and selection summaries.
pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a browser extension that helps the user understand the contents of a web page.";

/// System prompt for form filling.
pub const FORM_SYSTEM_PROMPT: &str = "You are a browser extension that helps the user fill in a form.";

/// Instruction used when the user typed none.
pub const DEFAULT_INSTRUCTIONS: &str = "Summarize this text.";

const NO_QUOTES: &str = "Do not wrap your response in quotes.";

/// Build the conversation for summarizing `content`.
///
/// Order: system prompt, the profile's custom prompts, the user's
/// instructions (or [`DEFAULT_INSTRUCTIONS`]), then the content itself.
pub fn summary_messages(
    profile: &Profile,
    instructions: Option<&str>,
    content: &str,
) -> Vec<PromptMessage> {
    let mut messages = vec![PromptMessage::system(SUMMARY_SYSTEM_PROMPT)];

    messages.extend(
        profile
            .custom_prompts
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(PromptMessage::user),
    );

    let instructions = instructions
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTIONS);
    messages.push(PromptMessage::user(instructions));
    messages.push(PromptMessage::user(content));
    messages
}

/// Build the conversation for writing into a form field.
pub fn form_fill_messages(prompt: &str, context: Option<&str>) -> Vec<PromptMessage> {
    let mut messages = vec![PromptMessage::system(FORM_SYSTEM_PROMPT)];
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        messages.push(PromptMessage::user(format!(
            "For context, the page contains the following text: {context}"
        )));
    }
    messages.push(PromptMessage::user(NO_QUOTES));
    messages.push(PromptMessage::user(prompt));
    messages
}
