//! Coercion of persisted JSON into valid conversation models.
//!
//! Stored records may come from an older schema or be hand-edited, so every
//! field is read from an untyped `serde_json::Value` and coerced:
//!
//! - `role` is `assistant` only when it literally says so, otherwise `user`
//! - missing or non-string `content` becomes `""`
//! - missing or unparsable `createdAt` becomes the current time
//! - missing `failed` becomes `false`
//! - missing ids are regenerated; entries that are not objects are dropped

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::message::{new_message_id, now_timestamp, Message, MessageRole};
use super::model::{Conversation, ConversationCollection};
use crate::assistant::AssistantKind;

/// Coerces one persisted message. Returns `None` when `value` is not an object.
pub fn normalize_message(value: &Value) -> Option<Message> {
    let object = value.as_object()?;

    let role = match object.get("role").and_then(Value::as_str) {
        Some("assistant") => MessageRole::Assistant,
        _ => MessageRole::User,
    };

    Some(Message {
        id: string_field(object, "id").unwrap_or_else(new_message_id),
        role,
        content: object
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at: timestamp_field(object, "createdAt"),
        failed: object
            .get("failed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        image_attachment: string_field(object, "imageAttachment"),
    })
}

/// Applies the same rules to an already typed message (ids and timestamps can
/// still be blank or malformed when built by a caller).
pub fn sanitize_message(mut message: Message) -> Message {
    if message.id.trim().is_empty() {
        message.id = new_message_id();
    }
    if !is_valid_timestamp(&message.created_at) {
        message.created_at = now_timestamp();
    }
    if message
        .image_attachment
        .as_deref()
        .is_some_and(|image| image.trim().is_empty())
    {
        message.image_attachment = None;
    }
    message
}

/// Coerces one persisted conversation and recomputes its derived fields.
pub fn normalize_conversation(value: &Value, kind: AssistantKind) -> Option<Conversation> {
    let object = value.as_object()?;

    let messages = object
        .get("messages")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(normalize_message).collect())
        .unwrap_or_default();

    let mut conversation = Conversation {
        id: string_field(object, "id").unwrap_or_else(new_message_id),
        title: String::new(),
        preview: String::new(),
        message_count: 0,
        updated_at: timestamp_field(object, "updatedAt"),
        messages,
    };
    conversation.refresh(kind);
    Some(conversation)
}

/// Coerces a persisted `{ activeId, items }` record.
///
/// Returns `None` when the record holds no usable conversation, in which case
/// the caller treats storage as empty.
pub fn normalize_collection(value: &Value, kind: AssistantKind) -> Option<ConversationCollection> {
    let object = value.as_object()?;

    let mut seen = HashSet::new();
    let items: Vec<Conversation> = object
        .get("items")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|entry| normalize_conversation(entry, kind))
        .filter(|conversation| seen.insert(conversation.id.clone()))
        .collect();

    if items.is_empty() {
        return None;
    }

    let mut collection = ConversationCollection {
        active_id: string_field(object, "activeId").unwrap_or_default(),
        items,
    };
    collection.enforce_limit();
    Some(collection)
}

pub(crate) fn is_valid_timestamp(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn timestamp_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| is_valid_timestamp(s))
        .map(str::to_string)
        .unwrap_or_else(now_timestamp)
}
