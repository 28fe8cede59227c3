//! Conversation message types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply from the remote assistant.
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation.
///
/// Delivered messages are never edited. A message whose send failed keeps its
/// id and content and only has `failed` toggled when it is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Stable identifier; updates address messages by this id.
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
    #[serde(default)]
    pub failed: bool,
    /// Image attached to a solver question, as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_attachment: Option<String>,
}

impl Message {
    /// Creates a user message with a fresh id.
    pub fn user(content: impl Into<String>, image_attachment: Option<String>) -> Self {
        Self {
            id: new_message_id(),
            role: MessageRole::User,
            content: content.into(),
            created_at: now_timestamp(),
            failed: false,
            image_attachment,
        }
    }

    /// Creates an assistant message with a fresh id.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: now_timestamp(),
            failed: false,
            image_attachment: None,
        }
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Generates a message or conversation id.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 string.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
