//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: chat message types (`Message`, `MessageRole`)
//! - `model`: `Conversation` and the bounded `ConversationCollection`
//! - `labels`: title / preview derivation
//! - `normalize`: coercion of untyped persisted JSON into valid models

mod labels;
mod message;
mod model;
mod normalize;

pub use labels::{clip_text, derive_preview, derive_title, EMPTY_PREVIEW, IMAGE_PREVIEW, LABEL_MAX_CHARS};
pub use message::{new_message_id, now_timestamp, Message, MessageRole};
pub use model::{Conversation, ConversationCollection, MAX_CONVERSATIONS, MAX_MESSAGES};
pub use normalize::{normalize_collection, normalize_conversation, normalize_message, sanitize_message};
