//! Identity domain model.

use serde::{Deserialize, Serialize};

use crate::keys::{normalize_identity, GUEST_IDENTITY};

/// User profile returned by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub role: String,
    pub department: String,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

impl AuthUser {
    /// Identity used to partition stored conversation history.
    ///
    /// Prefers the user id, then the email address.
    pub fn storage_identity(&self) -> String {
        [self.id.as_str(), self.email.as_str()]
            .into_iter()
            .find(|candidate| !candidate.trim().is_empty())
            .map(normalize_identity)
            .unwrap_or_else(|| GUEST_IDENTITY.to_string())
    }
}

/// Identity record persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIdentity {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_identity_prefers_id() {
        let user = AuthUser {
            id: "  U-42 ".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(user.storage_identity(), "u-42");
    }

    #[test]
    fn test_storage_identity_falls_back_to_email_then_guest() {
        let user = AuthUser {
            email: "Ada@Example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(user.storage_identity(), "ada@example.com");
        assert_eq!(AuthUser::default().storage_identity(), "guest");
    }

    #[test]
    fn test_user_tolerates_missing_optional_fields() {
        let user: AuthUser =
            serde_json::from_str(r#"{"id":"1","email":"a@b.co","name":"Ada"}"#).unwrap();
        assert_eq!(user.name, "Ada");
        assert!(user.picture.is_empty());
        assert!(user.created_at.is_none());
    }
}
