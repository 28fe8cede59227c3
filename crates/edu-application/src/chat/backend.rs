//! Assistant backends: how a chat controller reaches its remote endpoint.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use edu_core::store::DurableStore;
use edu_core::AssistantKind;
use edu_interaction::dto::{ChatRequest, HistoryEntry, SolverChatRequest};
use edu_interaction::{AssistantApi, RequestError};

use crate::study::StudyContext;

/// One remote assistant.
///
/// The controller owns message bookkeeping; a backend only turns a question
/// plus prior turns into an answer.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    fn kind(&self) -> AssistantKind;

    /// Asks the assistant. `image` is only passed to kinds that accept images.
    async fn reply(
        &self,
        message: &str,
        image: Option<&str>,
        history: Vec<HistoryEntry>,
    ) -> Result<String, RequestError>;
}

/// Lecture-aware chat over `/chat`.
///
/// Sends the current summary along with each question and keeps the session
/// id the service hands back, so follow-ups share the backend session.
pub struct ContextualChat {
    api: Arc<dyn AssistantApi>,
    context: RwLock<StudyContext>,
    store: Option<DurableStore>,
}

impl ContextualChat {
    pub fn new(api: Arc<dyn AssistantApi>, context: StudyContext) -> Self {
        Self {
            api,
            context: RwLock::new(context),
            store: None,
        }
    }

    /// Writes the study context back to `store` whenever the session id changes.
    pub fn persist_to(mut self, store: DurableStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn session_id(&self) -> Option<String> {
        self.read_context().session_id.clone()
    }

    fn read_context(&self) -> std::sync::RwLockReadGuard<'_, StudyContext> {
        match self.context.read() {
            Ok(context) => context,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn remember_session(&self, session_id: String) {
        if session_id.trim().is_empty() {
            return;
        }

        let updated = {
            let mut context = match self.context.write() {
                Ok(context) => context,
                Err(poisoned) => poisoned.into_inner(),
            };
            if context.session_id.as_deref() == Some(session_id.as_str()) {
                return;
            }
            tracing::debug!(session_id = %session_id, "Chat session assigned");
            context.session_id = Some(session_id);
            context.clone()
        };

        if let Some(store) = &self.store {
            updated.save(store);
        }
    }
}

#[async_trait]
impl AssistantBackend for ContextualChat {
    fn kind(&self) -> AssistantKind {
        AssistantKind::Chat
    }

    async fn reply(
        &self,
        message: &str,
        _image: Option<&str>,
        history: Vec<HistoryEntry>,
    ) -> Result<String, RequestError> {
        let request = {
            let context = self.read_context();
            ChatRequest {
                message: message.to_string(),
                session_id: context.session_id.clone(),
                summary: context.summary.clone(),
                history,
            }
        };

        let response = self.api.chat(&request).await?;
        self.remember_session(response.session_id);
        Ok(response.answer)
    }
}

/// Question sent when the user attached an image without typing anything.
/// The service rejects an empty `message`.
pub const IMAGE_ONLY_PROMPT: &str = "Solve the problem shown in the attached image.";

/// Homework solver over `/solver_chat`; accepts an optional image.
pub struct SolverChat {
    api: Arc<dyn AssistantApi>,
}

impl SolverChat {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AssistantBackend for SolverChat {
    fn kind(&self) -> AssistantKind {
        AssistantKind::Solver
    }

    async fn reply(
        &self,
        message: &str,
        image: Option<&str>,
        history: Vec<HistoryEntry>,
    ) -> Result<String, RequestError> {
        let message = match message.trim() {
            "" if image.is_some() => IMAGE_ONLY_PROMPT,
            text => text,
        };
        let request = SolverChatRequest {
            message: message.to_string(),
            history,
            image_data_url: image.map(str::to_string),
        };

        Ok(self.api.solver_chat(&request).await?.answer)
    }
}
