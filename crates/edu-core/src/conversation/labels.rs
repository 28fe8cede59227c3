//! Title and preview derivation.
//!
//! Titles and previews are never authored directly; they are recomputed from
//! the message list every time a conversation changes.

use super::message::{Message, MessageRole};
use crate::assistant::AssistantKind;

/// Maximum number of characters kept from a message for a title or preview.
pub const LABEL_MAX_CHARS: usize = 44;

/// Preview shown for a conversation without messages.
pub const EMPTY_PREVIEW: &str = "No messages yet.";

/// Preview shown when the latest message is an image without text.
pub const IMAGE_PREVIEW: &str = "Image attachment";

/// Collapses whitespace and clips `text` to `max_chars` characters, adding an
/// ellipsis when something was cut.
pub fn clip_text(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let head: String = collapsed.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}

/// Title for a conversation: its first user message, or `"New <Label>"`.
pub fn derive_title(kind: AssistantKind, messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == MessageRole::User)
        .map(|m| clip_text(&m.content, LABEL_MAX_CHARS))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| format!("New {}", kind.label()))
}

/// Preview for a conversation: its most recent message.
pub fn derive_preview(messages: &[Message]) -> String {
    let Some(last) = messages.last() else {
        return EMPTY_PREVIEW.to_string();
    };

    let preview = clip_text(&last.content, LABEL_MAX_CHARS);
    if preview.is_empty() && last.image_attachment.is_some() {
        IMAGE_PREVIEW.to_string()
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_text_collapses_whitespace() {
        assert_eq!(clip_text("  what   is\n\ta  limit? ", 44), "what is a limit?");
    }

    #[test]
    fn test_clip_text_ellipsizes_long_text() {
        let long = "a".repeat(60);
        let clipped = clip_text(&long, 44);
        assert_eq!(clipped, format!("{}...", "a".repeat(44)));
    }

    #[test]
    fn test_clip_text_keeps_exact_length() {
        let exact = "b".repeat(44);
        assert_eq!(clip_text(&exact, 44), exact);
    }

    #[test]
    fn test_title_defaults_without_user_message() {
        assert_eq!(derive_title(AssistantKind::Chat, &[]), "New Chat");
        let only_assistant = vec![Message::assistant("Hello there")];
        assert_eq!(derive_title(AssistantKind::Solver, &only_assistant), "New Solver");
    }

    #[test]
    fn test_title_uses_first_user_message() {
        let messages = vec![
            Message::assistant("Welcome"),
            Message::user("Explain entropy", None),
            Message::user("And enthalpy?", None),
        ];
        assert_eq!(derive_title(AssistantKind::Chat, &messages), "Explain entropy");
    }

    #[test]
    fn test_preview_uses_latest_message() {
        assert_eq!(derive_preview(&[]), EMPTY_PREVIEW);
        let messages = vec![
            Message::user("Explain entropy", None),
            Message::assistant("Entropy measures disorder."),
        ];
        assert_eq!(derive_preview(&messages), "Entropy measures disorder.");
    }

    #[test]
    fn test_preview_for_image_only_message() {
        let messages = vec![Message::user("", Some("data:image/png;base64,AA==".into()))];
        assert_eq!(derive_preview(&messages), IMAGE_PREVIEW);
    }
}
