//! Prompt construction for channel and thread digests.
//!
//! Both builders are pure: the same messages and instruction always produce
//! the same prompt string.

use crate::core::models::Message;
use crate::errors::DigestError;

/// Maximum length accepted for a custom instruction.
pub const MAX_CUSTOM_PROMPT_LENGTH: usize = 4000;

const CHANNEL_INSTRUCTIONS: [&str; 4] = [
    "Combine the messages into a concise digest with bullet points.",
    "Each message is prefixed with the user name.",
    "If an item contains multiple messages, that means it's a discussion.",
    "Omit greetings and signatures.",
];

const THREAD_INSTRUCTIONS: [&str; 4] = [
    "Summarize the following Slack thread.",
    "Each message is prefixed with the user name.",
    "Omit greetings and signatures.",
    "Highlight decisions and next steps at the end if necessary.",
];

/// Default instruction preamble for a channel digest.
#[must_use]
pub fn default_channel_instruction(channel_name: &str) -> String {
    let channel = channel_name.trim_start_matches('#');
    let mut lines = vec![format!(
        "Summarize the following Slack conversations from #{channel}."
    )];
    lines.extend(CHANNEL_INSTRUCTIONS.iter().map(ToString::to_string));
    lines.join("\n")
}

/// Default instruction preamble for a thread digest.
#[must_use]
pub fn default_thread_instruction() -> String {
    THREAD_INSTRUCTIONS.join("\n")
}

/// Serializes messages one per line as `<author>: <text>`.
#[must_use]
pub fn format_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.author, m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn build_channel_prompt(
    messages: &[Message],
    channel_name: &str,
    custom_instruction: Option<&str>,
) -> String {
    let instruction = effective_instruction(custom_instruction)
        .map_or_else(|| default_channel_instruction(channel_name), ToString::to_string);
    assemble(&instruction, messages)
}

#[must_use]
pub fn build_thread_prompt(messages: &[Message], custom_instruction: Option<&str>) -> String {
    let instruction = effective_instruction(custom_instruction)
        .map_or_else(default_thread_instruction, ToString::to_string);
    assemble(&instruction, messages)
}

/// Validates a user-supplied instruction before it is stored or used.
///
/// # Errors
///
/// Returns `ConfigError` if the instruction exceeds [`MAX_CUSTOM_PROMPT_LENGTH`] characters.
pub fn validate_custom_prompt(prompt: &str) -> Result<(), DigestError> {
    let len = prompt.chars().count();
    if len > MAX_CUSTOM_PROMPT_LENGTH {
        return Err(DigestError::ConfigError(format!(
            "Custom prompt exceeds maximum length of {MAX_CUSTOM_PROMPT_LENGTH} characters ({len})"
        )));
    }
    Ok(())
}

// Blank overrides fall back to the default instruction.
fn effective_instruction(custom: Option<&str>) -> Option<&str> {
    custom.filter(|s| !s.trim().is_empty())
}

fn assemble(instruction: &str, messages: &[Message]) -> String {
    format!("{instruction}\n\n{}", format_messages(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg(author: &str, text: &str) -> Message {
        Message {
            author: author.to_string(),
            text: text.to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn channel_name_hash_is_not_doubled() {
        assert!(
            default_channel_instruction("#general")
                .starts_with("Summarize the following Slack conversations from #general.")
        );
    }

    #[test]
    fn blank_override_uses_default() {
        let messages = [msg("ana", "hi")];
        assert_eq!(
            build_thread_prompt(&messages, Some("   ")),
            build_thread_prompt(&messages, None)
        );
    }

    #[test]
    fn empty_message_list_keeps_preamble() {
        let prompt = build_thread_prompt(&[], None);
        assert_eq!(prompt, format!("{}\n\n", default_thread_instruction()));
    }

    #[test]
    fn rejects_overlong_prompt() {
        let long = "a".repeat(MAX_CUSTOM_PROMPT_LENGTH + 1);
        assert!(validate_custom_prompt(&long).is_err());
        assert!(validate_custom_prompt("Summarize in French.").is_ok());
    }
}
