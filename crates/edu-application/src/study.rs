//! Study session facade.
//!
//! Wires identity, remote API and durable store together for the front end:
//! lecture summarization, MCQs, PDF export and per-user chat controllers.

use std::sync::Arc;

use edu_core::keys::{history_key, STUDY_KEY};
use edu_core::store::DurableStore;
use edu_core::AssistantKind;
use edu_interaction::dto::{CaptionsRequest, McqRequest, McqResponse, StructuredSummary, SummarizeRequest};
use edu_interaction::{AssistantApi, EduApi, RequestError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::{AssistantBackend, ChatController, ContextualChat, SolverChat};
use crate::history::ConversationHistory;
use crate::identity::IdentityContext;

/// The lecture currently being studied, remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyContext {
    /// Backend session holding the transcript and summary.
    pub session_id: Option<String>,
    pub summary: Option<StructuredSummary>,
    pub video_url: Option<String>,
    pub video_title: Option<String>,
}

impl StudyContext {
    /// Loads the stored context; anything unreadable yields an empty one.
    pub fn load(store: &DurableStore) -> Self {
        store.read_as(STUDY_KEY).unwrap_or_default()
    }

    pub fn save(&self, store: &DurableStore) {
        store.write(STUDY_KEY, self);
    }

    pub fn has_lecture(&self) -> bool {
        self.session_id.is_some() || self.summary.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("No lecture has been summarized yet")]
    NoLecture,
}

impl StudyError {
    /// Single line suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(e) => e.user_message(),
            Self::NoLecture => self.to_string(),
        }
    }
}

/// Entry point used by the front end.
pub struct StudySession {
    api: Arc<EduApi>,
    store: DurableStore,
    identity: IdentityContext,
}

impl StudySession {
    pub fn new(api: Arc<EduApi>, store: DurableStore) -> Self {
        let identity = IdentityContext::new(api.clone(), store.clone());
        Self { api, store, identity }
    }

    pub fn api(&self) -> &EduApi {
        &self.api
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    pub fn study_context(&self) -> StudyContext {
        StudyContext::load(&self.store)
    }

    /// Fetches the captions of a video, summarizes them and remembers the
    /// result as the current lecture.
    pub async fn summarize_video(&self, youtube_url: &str) -> Result<StudyContext, StudyError> {
        let captions = self
            .api
            .extract_captions(&CaptionsRequest {
                youtube_url: youtube_url.trim().to_string(),
                language: None,
            })
            .await?;
        tracing::debug!(video_id = %captions.video_id, "Captions extracted");

        let summarized = self
            .api
            .summarize(&SummarizeRequest {
                transcript: captions.transcript,
                session_id: None,
            })
            .await?;

        let context = StudyContext {
            session_id: Some(summarized.session_id),
            summary: Some(summarized.summary),
            video_url: Some(youtube_url.trim().to_string()),
            video_title: Some(captions.title).filter(|t| !t.trim().is_empty()),
        };
        context.save(&self.store);
        tracing::info!(title = ?context.video_title, "Lecture summarized");
        Ok(context)
    }

    /// Generates multiple-choice questions for the current lecture.
    pub async fn generate_mcqs(&self) -> Result<McqResponse, StudyError> {
        let mut context = self.study_context();
        if !context.has_lecture() {
            return Err(StudyError::NoLecture);
        }

        let response = self
            .api
            .mcq(&McqRequest {
                session_id: context.session_id.clone(),
                summary: context.summary.clone(),
            })
            .await?;

        if !response.session_id.trim().is_empty()
            && context.session_id.as_deref() != Some(response.session_id.as_str())
        {
            context.session_id = Some(response.session_id.clone());
            context.save(&self.store);
        }
        Ok(response)
    }

    /// Downloads the PDF export of the current lecture.
    pub async fn download_pdf(&self) -> Result<Vec<u8>, StudyError> {
        let session_id = self.study_context().session_id.ok_or(StudyError::NoLecture)?;
        Ok(self.api.pdf(&session_id).await?)
    }

    /// Builds the chat controller of `kind` for the signed-in user.
    ///
    /// Revalidates the stored identity first so history lands under the
    /// right user.
    pub async fn chat_controller(&self, kind: AssistantKind) -> ChatController {
        self.identity.bootstrap().await;

        let assistant_api: Arc<dyn AssistantApi> = self.api.clone();
        let backend: Arc<dyn AssistantBackend> = match kind {
            AssistantKind::Chat => Arc::new(
                ContextualChat::new(assistant_api, self.study_context()).persist_to(self.store.clone()),
            ),
            AssistantKind::Solver => Arc::new(SolverChat::new(assistant_api)),
        };

        let key = history_key(kind, &self.identity.storage_identity());
        let history = ConversationHistory::initialize(self.store.clone(), key, kind, Vec::new());
        ChatController::new(backend, history)
    }
}
