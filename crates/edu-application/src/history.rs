//! Conversation history repository.
//!
//! [`ConversationHistory`] owns the conversation collection of one
//! (assistant kind, user) pair and writes it back to the durable store after
//! every change. Persisted data is treated as untyped input and always goes
//! through normalization on load.

use edu_core::conversation::{
    normalize_collection, sanitize_message, Conversation, ConversationCollection, Message,
};
use edu_core::store::DurableStore;
use edu_core::AssistantKind;

/// Conversations of one assistant for one user.
///
/// The collection is never empty: removing the last conversation synthesizes
/// a fresh one immediately.
pub struct ConversationHistory {
    store: DurableStore,
    key: String,
    kind: AssistantKind,
    collection: ConversationCollection,
}

impl ConversationHistory {
    /// Loads the collection stored under `key`.
    ///
    /// When nothing usable is stored, a conversation seeded with
    /// `current_messages` becomes the sole (and active) member and is
    /// persisted right away.
    pub fn initialize(
        store: DurableStore,
        key: impl Into<String>,
        kind: AssistantKind,
        current_messages: Vec<Message>,
    ) -> Self {
        let key = key.into();

        let stored = store
            .read(&key)
            .and_then(|value| normalize_collection(&value, kind));

        let (collection, seeded) = match stored {
            Some(collection) => (collection, false),
            None => {
                let messages = current_messages.into_iter().map(sanitize_message).collect();
                let conversation = Conversation::with_messages(kind, messages);
                (ConversationCollection::with_conversation(conversation), true)
            }
        };

        tracing::debug!(
            key = %key,
            conversations = collection.items.len(),
            seeded,
            "Conversation history loaded"
        );

        let history = Self {
            store,
            key,
            kind,
            collection,
        };
        if seeded {
            history.persist();
        }
        history
    }

    pub fn kind(&self) -> AssistantKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn active_id(&self) -> &str {
        &self.collection.active_id
    }

    /// Conversations, most recently touched first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.collection.items
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.collection.get(conversation_id)
    }

    /// Messages of the active conversation.
    pub fn active_messages(&self) -> &[Message] {
        self.collection
            .active()
            .map(|c| c.messages.as_slice())
            .unwrap_or_default()
    }

    /// Stores a new message list for a conversation.
    ///
    /// Derived fields are recomputed, the conversation moves to the front and
    /// the collection is persisted. Returns `false` for an unknown id.
    pub fn record_update(&mut self, conversation_id: &str, messages: Vec<Message>) -> bool {
        let kind = self.kind;
        let Some(conversation) = self.collection.get_mut(conversation_id) else {
            return false;
        };

        let messages = messages.into_iter().map(sanitize_message).collect();
        conversation.replace_messages(kind, messages);
        self.collection.move_to_front(conversation_id);
        self.persist();
        true
    }

    /// Makes a conversation active and returns its messages.
    pub fn select(&mut self, conversation_id: &str) -> Option<Vec<Message>> {
        let messages = self.collection.get(conversation_id)?.messages.clone();
        self.collection.active_id = conversation_id.to_string();
        self.persist();
        Some(messages)
    }

    /// Starts a new empty conversation and makes it active.
    ///
    /// An active conversation that has no messages yet is reused instead of
    /// stacking another empty one in front of it.
    pub fn create(&mut self) -> String {
        if let Some(active) = self.collection.active() {
            if active.messages.is_empty() {
                let id = active.id.clone();
                self.collection.move_to_front(&id);
                self.persist();
                return id;
            }
        }

        let conversation = Conversation::new(self.kind);
        let id = conversation.id.clone();
        let evicted = self.collection.insert_front(conversation);
        if !evicted.is_empty() {
            tracing::debug!(key = %self.key, evicted = evicted.len(), "Evicted old conversations");
        }
        self.collection.active_id = id.clone();
        self.persist();
        id
    }

    /// Deletes a conversation.
    ///
    /// When the active conversation is removed, the front conversation takes
    /// over and its messages are returned. Unknown ids are ignored.
    pub fn remove(&mut self, conversation_id: &str) -> Option<Vec<Message>> {
        self.collection.remove(conversation_id)?;

        if self.collection.items.is_empty() {
            self.collection = ConversationCollection::with_conversation(Conversation::new(self.kind));
            self.persist();
            return Some(Vec::new());
        }

        let was_active = self.collection.active_id == conversation_id;
        if was_active {
            self.collection.active_id = self.collection.items[0].id.clone();
        }
        self.persist();

        was_active.then(|| self.active_messages().to_vec())
    }

    /// Appends a message to a conversation. Returns `false` for an unknown id.
    pub fn push_message(&mut self, conversation_id: &str, message: Message) -> bool {
        let Some(conversation) = self.collection.get(conversation_id) else {
            return false;
        };
        let mut messages = conversation.messages.clone();
        messages.push(message);
        self.record_update(conversation_id, messages)
    }

    /// Applies `f` to one message of a conversation, addressed by id.
    ///
    /// Returns `false` when either id is unknown.
    pub fn update_message<F>(&mut self, conversation_id: &str, message_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        let Some(conversation) = self.collection.get(conversation_id) else {
            return false;
        };
        let mut messages = conversation.messages.clone();
        let Some(message) = messages.iter_mut().find(|m| m.id == message_id) else {
            return false;
        };
        f(message);
        self.record_update(conversation_id, messages)
    }

    fn persist(&self) {
        self.store.write(&self.key, &self.collection);
    }
}
