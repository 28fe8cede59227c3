//! Optimistic send / fail / retry flow for one assistant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use edu_core::conversation::Message;
use edu_core::AssistantKind;
use edu_interaction::dto::HistoryEntry;

use super::backend::AssistantBackend;
use crate::history::ConversationHistory;

/// Number of prior messages sent along with a question.
pub const HISTORY_WINDOW: usize = 10;

/// Result of a [`ChatController::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent: blank input, unknown message, or a send in flight.
    Ignored,
    /// The assistant answered; its reply was appended.
    Delivered { message_id: String, reply_id: String },
    /// The request failed; the message is flagged and can be retried.
    Failed { message_id: String, error: String },
}

/// Drives one assistant conversation view.
///
/// Only one send is in flight at a time. The user message is appended before
/// the request goes out; the outcome is written into the conversation that
/// was active when the send started, even if the user switched since.
pub struct ChatController {
    backend: Arc<dyn AssistantBackend>,
    history: Mutex<ConversationHistory>,
    sending: AtomicBool,
}

/// Clears the in-flight flag when the send finishes or its future is dropped.
struct SendingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// What was prepared under the lock before the network call.
struct PendingSend {
    conversation_id: String,
    message_id: String,
    text: String,
    image: Option<String>,
    history: Vec<HistoryEntry>,
}

impl ChatController {
    pub fn new(backend: Arc<dyn AssistantBackend>, history: ConversationHistory) -> Self {
        Self {
            backend,
            history: Mutex::new(history),
            sending: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> AssistantKind {
        self.backend.kind()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Messages of the active conversation.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_history().active_messages().to_vec()
    }

    /// Runs `f` with exclusive access to the conversation history
    /// (select, create, remove).
    pub fn with_history<R>(&self, f: impl FnOnce(&mut ConversationHistory) -> R) -> R {
        let mut history = self.lock_history();
        f(&mut *history)
    }

    /// Sends a question.
    ///
    /// With `existing_message_id`, the stored message with that id is resent
    /// in place (its `failed` flag cleared) instead of appending a new one;
    /// its own content and image are sent and `text`/`image` are ignored.
    /// Images are dropped for assistants that do not accept them.
    pub async fn send(
        &self,
        text: &str,
        image: Option<String>,
        existing_message_id: Option<&str>,
    ) -> SendOutcome {
        let text = text.trim();
        let image = image
            .filter(|image| !image.trim().is_empty())
            .filter(|_| self.kind().accepts_images());

        if existing_message_id.is_none() && text.is_empty() && image.is_none() {
            return SendOutcome::Ignored;
        }

        let Some(_guard) = SendingGuard::claim(&self.sending) else {
            tracing::debug!(kind = %self.kind(), "Send ignored while another is in flight");
            return SendOutcome::Ignored;
        };

        let Some(pending) = self.prepare(text, image, existing_message_id) else {
            return SendOutcome::Ignored;
        };

        let result = self
            .backend
            .reply(&pending.text, pending.image.as_deref(), pending.history)
            .await;

        let mut history = self.lock_history();
        match result {
            Ok(answer) => {
                let reply = Message::assistant(answer);
                let reply_id = reply.id.clone();
                if !history.push_message(&pending.conversation_id, reply) {
                    tracing::debug!(
                        conversation_id = %pending.conversation_id,
                        "Discarding reply for a deleted conversation"
                    );
                }
                SendOutcome::Delivered {
                    message_id: pending.message_id,
                    reply_id,
                }
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind(), error = %e, "Assistant request failed");
                history.update_message(&pending.conversation_id, &pending.message_id, |m| {
                    m.failed = true
                });
                SendOutcome::Failed {
                    message_id: pending.message_id,
                    error: e.user_message(),
                }
            }
        }
    }

    /// Resends a failed message of the active conversation with its original
    /// content, image and id.
    pub async fn retry(&self, message_id: &str) -> SendOutcome {
        let original = self
            .lock_history()
            .active_messages()
            .iter()
            .find(|m| m.id == message_id && m.is_user() && m.failed)
            .cloned();

        match original {
            Some(message) => {
                self.send(&message.content, message.image_attachment, Some(&message.id))
                    .await
            }
            None => SendOutcome::Ignored,
        }
    }

    fn prepare(
        &self,
        text: &str,
        image: Option<String>,
        existing_message_id: Option<&str>,
    ) -> Option<PendingSend> {
        let mut history = self.lock_history();
        let conversation_id = history.active_id().to_string();

        let (message_id, text, image) = match existing_message_id {
            Some(id) => {
                let stored = history.active_messages().iter().find(|m| m.id == id)?;
                let content = stored.content.clone();
                let attachment = stored
                    .image_attachment
                    .clone()
                    .filter(|_| self.kind().accepts_images());
                if content.trim().is_empty() && attachment.is_none() {
                    return None;
                }
                history.update_message(&conversation_id, id, |m| m.failed = false);
                (id.to_string(), content, attachment)
            }
            None => {
                let message = Message::user(text, image.clone());
                let id = message.id.clone();
                history.push_message(&conversation_id, message);
                (id, text.to_string(), image)
            }
        };

        let others: Vec<&Message> = history
            .active_messages()
            .iter()
            .filter(|m| m.id != message_id)
            .collect();
        let start = others.len().saturating_sub(HISTORY_WINDOW);
        let payload = others[start..]
            .iter()
            .map(|m| HistoryEntry {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        Some(PendingSend {
            conversation_id,
            message_id,
            text,
            image,
            history: payload,
        })
    }

    fn lock_history(&self) -> MutexGuard<'_, ConversationHistory> {
        match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::backend::{ContextualChat, SolverChat, IMAGE_ONLY_PROMPT};
    use crate::study::StudyContext;
    use async_trait::async_trait;
    use edu_core::keys::STUDY_KEY;
    use edu_core::store::DurableStore;
    use edu_infrastructure::MemoryKeyValueStore;
    use edu_interaction::dto::{
        ChatRequest, ChatResponse, SolverChatRequest, SolverChatResponse, StructuredSummary,
    };
    use edu_interaction::{AssistantApi, RequestError};
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    // Mock API answering from a queue of scripted results
    #[derive(Default)]
    struct MockAssistantApi {
        replies: Mutex<VecDeque<Result<String, RequestError>>>,
        chat_requests: Mutex<Vec<ChatRequest>>,
        solver_requests: Mutex<Vec<SolverChatRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl MockAssistantApi {
        fn scripted(replies: Vec<Result<String, RequestError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        async fn next_reply(&self) -> Result<String, RequestError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("ok".to_string()))
        }
    }

    #[async_trait]
    impl AssistantApi for MockAssistantApi {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, RequestError> {
            self.chat_requests.lock().unwrap().push(request.clone());
            let answer = self.next_reply().await?;
            Ok(ChatResponse {
                session_id: "sess-1".to_string(),
                answer,
            })
        }

        async fn solver_chat(&self, request: &SolverChatRequest) -> Result<SolverChatResponse, RequestError> {
            self.solver_requests.lock().unwrap().push(request.clone());
            Ok(SolverChatResponse {
                answer: self.next_reply().await?,
            })
        }
    }

    fn memory_store() -> DurableStore {
        DurableStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    fn history(store: &DurableStore, kind: AssistantKind) -> ConversationHistory {
        ConversationHistory::initialize(store.clone(), "history", kind, Vec::new())
    }

    fn solver(api: Arc<MockAssistantApi>, store: &DurableStore) -> ChatController {
        ChatController::new(
            Arc::new(SolverChat::new(api)),
            history(store, AssistantKind::Solver),
        )
    }

    fn quota_exceeded() -> RequestError {
        RequestError::server(500, r#"{"detail": "quota exceeded"}"#)
    }

    #[tokio::test]
    async fn test_send_appends_user_and_assistant_messages() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::scripted(vec![Ok("x = 4".to_string())]));
        let controller = solver(api.clone(), &store);

        let outcome = controller.send("  Solve 2x = 8 ", None, None).await;

        let messages = controller.messages();
        assert!(matches!(outcome, SendOutcome::Delivered { .. }));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Solve 2x = 8");
        assert!(messages[0].is_user());
        assert_eq!(messages[1].content, "x = 4");
        assert!(!controller.is_sending());
        assert!(api.solver_requests.lock().unwrap()[0].history.is_empty());
    }

    #[tokio::test]
    async fn test_blank_send_is_ignored() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let controller = solver(api.clone(), &store);

        assert_eq!(controller.send("   ", None, None).await, SendOutcome::Ignored);
        assert!(controller.messages().is_empty());
        assert!(api.solver_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_only_send_goes_to_solver() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let controller = solver(api.clone(), &store);

        let outcome = controller
            .send("", Some("data:image/png;base64,AAAA".to_string()), None)
            .await;

        assert!(matches!(outcome, SendOutcome::Delivered { .. }));
        let requests = api.solver_requests.lock().unwrap();
        assert_eq!(requests[0].image_data_url.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(requests[0].message, IMAGE_ONLY_PROMPT);
        assert_eq!(controller.with_history(|h| h.conversations()[0].preview.clone()), "ok");

        // The stored question stays empty; only the request carries the prompt.
        let messages = controller.messages();
        assert!(messages[0].content.is_empty());
        assert!(messages[0].image_attachment.is_some());
    }

    #[tokio::test]
    async fn test_contextual_chat_drops_images() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let controller = ChatController::new(
            Arc::new(ContextualChat::new(api.clone(), StudyContext::default())),
            history(&store, AssistantKind::Chat),
        );

        let outcome = controller
            .send("", Some("data:image/png;base64,AAAA".to_string()), None)
            .await;
        assert_eq!(outcome, SendOutcome::Ignored);

        controller
            .send("What is a vector?", Some("data:image/png;base64,AAAA".to_string()), None)
            .await;
        assert!(controller.messages()[0].image_attachment.is_none());
    }

    #[tokio::test]
    async fn test_send_while_in_flight_is_ignored() {
        let store = memory_store();
        let gate = Arc::new(Notify::new());
        let api = Arc::new(MockAssistantApi {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let controller = Arc::new(solver(api.clone(), &store));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("first", None, None).await })
        };
        while !controller.is_sending() {
            tokio::task::yield_now().await;
        }

        let second = controller.send("second", None, None).await;
        assert_eq!(second, SendOutcome::Ignored);

        gate.notify_one();
        assert!(matches!(first.await.unwrap(), SendOutcome::Delivered { .. }));

        let contents: Vec<String> = controller.messages().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["first", "ok"]);
        assert_eq!(api.solver_requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_flags_message_and_retry_clears_it() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::scripted(vec![
            Err(quota_exceeded()),
            Ok("Here is the answer.".to_string()),
        ]));
        let controller = solver(api.clone(), &store);

        let outcome = controller.send("Integrate x^2", None, None).await;
        let message_id = match outcome {
            SendOutcome::Failed { message_id, error } => {
                assert_eq!(error, "quota exceeded");
                message_id
            }
            other => panic!("unexpected outcome: {:?}", other),
        };

        let messages = controller.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].failed);

        let outcome = controller.retry(&message_id).await;
        assert!(matches!(outcome, SendOutcome::Delivered { message_id: ref id, .. } if *id == message_id));

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, message_id);
        assert!(!messages[0].failed);
        assert_eq!(messages[1].content, "Here is the answer.");

        let requests = api.solver_requests.lock().unwrap();
        assert_eq!(requests[1].message, "Integrate x^2");
        assert!(requests[1].history.is_empty());
    }

    #[tokio::test]
    async fn test_resend_uses_stored_content() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::scripted(vec![Err(quota_exceeded())]));
        let controller = solver(api.clone(), &store);

        let SendOutcome::Failed { message_id, .. } = controller
            .send("Factor x^2 - 1", Some("data:image/png;base64,AAAA".to_string()), None)
            .await
        else {
            panic!("expected failure");
        };

        let outcome = controller.send("something else", None, Some(&message_id)).await;
        assert!(matches!(outcome, SendOutcome::Delivered { .. }));

        let requests = api.solver_requests.lock().unwrap();
        assert_eq!(requests[1].message, "Factor x^2 - 1");
        assert_eq!(requests[1].image_data_url.as_deref(), Some("data:image/png;base64,AAAA"));

        let messages = controller.messages();
        assert_eq!(messages[0].content, "Factor x^2 - 1");
        assert!(!messages[0].failed);
    }

    #[tokio::test]
    async fn test_retry_requires_failed_message() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let controller = solver(api, &store);

        let SendOutcome::Delivered { message_id, .. } = controller.send("hi", None, None).await else {
            panic!("expected delivery");
        };

        assert_eq!(controller.retry(&message_id).await, SendOutcome::Ignored);
        assert_eq!(controller.retry("unknown").await, SendOutcome::Ignored);
        assert_eq!(controller.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_history_payload_is_last_ten_in_order() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let controller = solver(api.clone(), &store);

        for i in 0..6 {
            controller.send(&format!("q{}", i), None, None).await;
        }
        controller.send("final", None, None).await;

        let requests = api.solver_requests.lock().unwrap();
        let history = &requests.last().unwrap().history;
        assert_eq!(history.len(), HISTORY_WINDOW);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[0].role, "user");
        assert_eq!(history[9].content, "ok");
        assert_eq!(history[9].role, "assistant");
    }

    #[tokio::test]
    async fn test_reply_lands_in_originating_conversation() {
        let store = memory_store();
        let gate = Arc::new(Notify::new());
        let api = Arc::new(MockAssistantApi {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let controller = Arc::new(solver(api, &store));
        let origin = controller.with_history(|h| h.active_id().to_string());

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("slow question", None, None).await })
        };
        while !controller.is_sending() {
            tokio::task::yield_now().await;
        }

        let other = controller.with_history(|h| h.create());
        gate.notify_one();
        pending.await.unwrap();

        controller.with_history(|h| {
            assert_eq!(h.active_id(), other);
            assert!(h.active_messages().is_empty());
            let origin = h.conversation(&origin).unwrap();
            assert_eq!(origin.message_count, 2);
            assert_eq!(origin.messages[1].content, "ok");
        });
    }

    #[tokio::test]
    async fn test_reply_for_deleted_conversation_is_discarded() {
        let store = memory_store();
        let gate = Arc::new(Notify::new());
        let api = Arc::new(MockAssistantApi {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let controller = Arc::new(solver(api, &store));
        let origin = controller.with_history(|h| h.active_id().to_string());

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.send("question", None, None).await })
        };
        while !controller.is_sending() {
            tokio::task::yield_now().await;
        }

        controller.with_history(|h| h.remove(&origin));
        gate.notify_one();
        assert!(matches!(pending.await.unwrap(), SendOutcome::Delivered { .. }));

        controller.with_history(|h| {
            assert_eq!(h.conversations().len(), 1);
            assert!(h.conversation(&origin).is_none());
            assert!(h.active_messages().is_empty());
        });
    }

    #[tokio::test]
    async fn test_contextual_chat_carries_summary_and_session() {
        let store = memory_store();
        let api = Arc::new(MockAssistantApi::default());
        let summary = StructuredSummary {
            core_concepts: vec!["Entropy".to_string()],
            ..Default::default()
        };
        let context = StudyContext {
            summary: Some(summary.clone()),
            ..Default::default()
        };
        let backend = Arc::new(ContextualChat::new(api.clone(), context).persist_to(store.clone()));
        let controller = ChatController::new(backend.clone(), history(&store, AssistantKind::Chat));

        controller.send("first", None, None).await;
        controller.send("second", None, None).await;

        let requests = api.chat_requests.lock().unwrap();
        assert_eq!(requests[0].session_id, None);
        assert_eq!(requests[0].summary.as_ref(), Some(&summary));
        assert_eq!(requests[1].session_id.as_deref(), Some("sess-1"));
        assert_eq!(backend.session_id().as_deref(), Some("sess-1"));

        let saved = StudyContext::load(&store);
        assert_eq!(saved.session_id.as_deref(), Some("sess-1"));
        assert!(store.read(STUDY_KEY).is_some());
    }
}
