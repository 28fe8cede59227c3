//! Typed access to the remote service endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use edu_core::identity::AuthUser;
use reqwest::Method;

use crate::client::{send_json, ResilientClient};
use crate::dto::{
    AuthResponse, CaptionsRequest, CaptionsResponse, ChatRequest, ChatResponse, HealthResponse,
    LoginRequest, McqRequest, McqResponse, RegisterRequest, SolverChatRequest, SolverChatResponse,
    SummarizeRequest, SummarizeResponse, VideoMetaResponse,
};
use crate::error::RequestError;

/// Authentication endpoints, abstracted so identity handling can be tested
/// without a server.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, RequestError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, RequestError>;

    /// Returns the profile of the bearer of the current token.
    async fn me(&self) -> Result<AuthUser, RequestError>;

    /// Sets or clears the token attached to later requests.
    fn set_token(&self, token: Option<String>);
}

/// Chat endpoints used by the chat controllers.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, RequestError>;

    async fn solver_chat(&self, request: &SolverChatRequest) -> Result<SolverChatResponse, RequestError>;
}

/// Remote service client: one method per endpoint.
#[derive(Clone)]
pub struct EduApi {
    client: Arc<ResilientClient>,
}

impl EduApi {
    pub fn new(client: Arc<ResilientClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ResilientClient> {
        &self.client
    }

    /// Checks that the service answers.
    ///
    /// With `allow_fallback == false` only the active address is probed.
    pub async fn health(&self, allow_fallback: bool) -> Result<HealthResponse, RequestError> {
        self.client
            .call(allow_fallback, |base| {
                let builder = self.client.request(Method::GET, &base, "/health");
                async move { send_json(builder, &base).await }
            })
            .await
    }

    pub async fn extract_captions(&self, request: &CaptionsRequest) -> Result<CaptionsResponse, RequestError> {
        self.client.post_json("/extract_captions", request).await
    }

    pub async fn video_meta(&self, request: &CaptionsRequest) -> Result<VideoMetaResponse, RequestError> {
        self.client.post_json("/video_meta", request).await
    }

    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse, RequestError> {
        self.client.post_json("/summarize", request).await
    }

    pub async fn mcq(&self, request: &McqRequest) -> Result<McqResponse, RequestError> {
        self.client.post_json("/mcq", request).await
    }

    /// Downloads the PDF export of a backend session.
    pub async fn pdf(&self, session_id: &str) -> Result<Vec<u8>, RequestError> {
        self.client
            .get_bytes("/pdf", &[("session_id", session_id)])
            .await
    }
}

#[async_trait]
impl AuthApi for EduApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, RequestError> {
        self.client.post_json("/auth/register", request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, RequestError> {
        self.client.post_json("/auth/login", request).await
    }

    async fn me(&self) -> Result<AuthUser, RequestError> {
        self.client.get_json("/auth/me").await
    }

    fn set_token(&self, token: Option<String>) {
        self.client.set_token(token);
    }
}

#[async_trait]
impl AssistantApi for EduApi {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, RequestError> {
        self.client.post_json("/chat", request).await
    }

    async fn solver_chat(&self, request: &SolverChatRequest) -> Result<SolverChatResponse, RequestError> {
        self.client.post_json("/solver_chat", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_set_token_reaches_client() {
        let client = Arc::new(ResilientClient::new(
            vec!["http://a".to_string()],
            Duration::from_secs(5),
        ));
        let api = EduApi::new(client.clone());

        AuthApi::set_token(&api, Some("abc".to_string()));
        assert_eq!(client.token().as_deref(), Some("abc"));

        AuthApi::set_token(&api, None);
        assert!(client.token().is_none());
    }
}
