//! Conversation and conversation-collection models.

use serde::{Deserialize, Serialize};

use super::labels::{derive_preview, derive_title};
use super::message::{new_message_id, now_timestamp, Message};
use crate::assistant::AssistantKind;

/// Maximum number of conversations kept per (assistant kind, user).
pub const MAX_CONVERSATIONS: usize = 12;

/// Maximum number of messages kept per conversation.
pub const MAX_MESSAGES: usize = 80;

/// A single conversation with one assistant.
///
/// `title`, `preview` and `message_count` are derived from `messages` by
/// [`Conversation::refresh`]; `message_count == messages.len()` always holds
/// after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub message_count: usize,
    /// Last time the message list changed (RFC 3339).
    pub updated_at: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation with a fresh id.
    pub fn new(kind: AssistantKind) -> Self {
        Self::with_messages(kind, Vec::new())
    }

    /// Creates a conversation seeded with existing messages.
    pub fn with_messages(kind: AssistantKind, messages: Vec<Message>) -> Self {
        let mut conversation = Self {
            id: new_message_id(),
            title: String::new(),
            preview: String::new(),
            message_count: 0,
            updated_at: now_timestamp(),
            messages,
        };
        conversation.refresh(kind);
        conversation
    }

    /// Caps the message list and recomputes the derived fields.
    ///
    /// `updated_at` is left untouched so reloading a stored conversation does
    /// not change it.
    pub fn refresh(&mut self, kind: AssistantKind) {
        if self.messages.len() > MAX_MESSAGES {
            let overflow = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..overflow);
        }
        self.title = derive_title(kind, &self.messages);
        self.preview = derive_preview(&self.messages);
        self.message_count = self.messages.len();
    }

    /// Replaces the message list, refreshes derived fields and bumps `updated_at`.
    pub fn replace_messages(&mut self, kind: AssistantKind, messages: Vec<Message>) {
        self.messages = messages;
        self.refresh(kind);
        self.updated_at = now_timestamp();
    }
}

/// All conversations of one (assistant kind, user) pair.
///
/// Serialized as the persisted record `{ "activeId": ..., "items": [...] }`.
/// Items are ordered most-recently-touched first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCollection {
    pub active_id: String,
    pub items: Vec<Conversation>,
}

impl ConversationCollection {
    /// Creates a collection whose only (and active) member is `conversation`.
    pub fn with_conversation(conversation: Conversation) -> Self {
        Self {
            active_id: conversation.id.clone(),
            items: vec![conversation],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.items.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.get(&self.active_id)
    }

    /// Inserts a conversation at the front and evicts the least recently
    /// touched ones beyond [`MAX_CONVERSATIONS`]. Returns the evicted ids.
    pub fn insert_front(&mut self, conversation: Conversation) -> Vec<String> {
        self.items.insert(0, conversation);
        self.enforce_limit()
    }

    /// Moves a conversation to the front. Returns `false` for an unknown id.
    pub fn move_to_front(&mut self, id: &str) -> bool {
        match self.items.iter().position(|c| c.id == id) {
            Some(0) => true,
            Some(index) => {
                let conversation = self.items.remove(index);
                self.items.insert(0, conversation);
                true
            }
            None => false,
        }
    }

    /// Removes a conversation by id.
    pub fn remove(&mut self, id: &str) -> Option<Conversation> {
        let index = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(index))
    }

    /// Truncates the collection to [`MAX_CONVERSATIONS`] and repoints a stale
    /// active id at the front conversation. Returns the evicted ids.
    pub fn enforce_limit(&mut self) -> Vec<String> {
        let evicted = if self.items.len() > MAX_CONVERSATIONS {
            self.items
                .drain(MAX_CONVERSATIONS..)
                .map(|c| c.id)
                .collect()
        } else {
            Vec::new()
        };

        if !self.contains(&self.active_id) {
            if let Some(front) = self.items.first() {
                self.active_id = front.id.clone();
            }
        }

        evicted
    }
}
