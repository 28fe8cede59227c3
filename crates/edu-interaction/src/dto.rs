//! Request and response payloads of the remote service.

use edu_core::identity::AuthUser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
    pub user: AuthUser,
}

// ============================================================================
// Lecture material
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CaptionsRequest {
    pub youtube_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionsResponse {
    pub video_id: String,
    pub transcript: String,
    pub title: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub used_title_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetaResponse {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub channel_title: String,
}

/// Structured lecture summary produced by `/summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredSummary {
    pub overview_paragraphs: Vec<String>,
    pub key_definitions: Vec<String>,
    pub core_concepts: Vec<String>,
    pub important_examples: Vec<String>,
    pub exam_revision_points: Vec<String>,
}

impl StructuredSummary {
    pub fn is_empty(&self) -> bool {
        self.overview_paragraphs.is_empty()
            && self.key_definitions.is_empty()
            && self.core_concepts.is_empty()
            && self.important_examples.is_empty()
            && self.exam_revision_points.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest {
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeResponse {
    pub session_id: String,
    pub summary: StructuredSummary,
}

// ============================================================================
// Chat
// ============================================================================

/// One prior turn sent along with a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StructuredSummary>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverChatRequest {
    pub message: String,
    pub history: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverChatResponse {
    pub answer: String,
}

// ============================================================================
// MCQ
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct McqRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StructuredSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McqItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McqResponse {
    pub session_id: String,
    pub mcqs: Vec<McqItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_omits_absent_fields() {
        let request = ChatRequest {
            message: "Explain X".to_string(),
            session_id: None,
            summary: None,
            history: vec![HistoryEntry {
                role: "assistant".to_string(),
                content: "Hi".to_string(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"message": "Explain X", "history": [{"role": "assistant", "content": "Hi"}]})
        );
    }

    #[test]
    fn test_auth_response_parses_backend_shape() {
        let response: AuthResponse = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 604800,
            "user": {"id": "u1", "email": "a@b.co", "name": "Ada", "picture": "", "role": "student",
                     "department": "", "created_at": null, "last_login_at": null}
        }))
        .unwrap();
        assert_eq!(response.access_token, "jwt");
        assert_eq!(response.user.role, "student");
    }

    #[test]
    fn test_summary_tolerates_missing_sections() {
        let summary: StructuredSummary =
            serde_json::from_value(json!({"core_concepts": ["Inertia"]})).unwrap();
        assert_eq!(summary.core_concepts, vec!["Inertia"]);
        assert!(!summary.is_empty());
        assert!(StructuredSummary::default().is_empty());
    }
}
