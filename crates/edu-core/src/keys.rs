//! Durable storage key layout.
//!
//! ```text
//! edu-simplify:auth                              # bearer token + cached profile
//! edu-simplify:study                             # last summary / backend session id
//! edu-simplify:history:<kind>:<user-identity>    # conversation collection
//! ```

use crate::assistant::AssistantKind;

/// Namespace prefix shared by every key this client writes.
pub const APP_NAMESPACE: &str = "edu-simplify";

/// Key of the persisted identity record.
pub const AUTH_KEY: &str = "edu-simplify:auth";

/// Key of the persisted study context (last summary and backend session).
pub const STUDY_KEY: &str = "edu-simplify:study";

/// Identity used when nobody is signed in.
pub const GUEST_IDENTITY: &str = "guest";

/// Normalizes a user identity for use inside a storage key.
///
/// Blank input maps to [`GUEST_IDENTITY`].
pub fn normalize_identity(identity: &str) -> String {
    let normalized = identity.trim().to_lowercase();
    if normalized.is_empty() {
        GUEST_IDENTITY.to_string()
    } else {
        normalized
    }
}

/// Builds the conversation-history key for an assistant kind and user.
pub fn history_key(kind: AssistantKind, identity: &str) -> String {
    format!(
        "{}:history:{}:{}",
        APP_NAMESPACE,
        kind.as_str(),
        normalize_identity(identity)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_key_is_namespaced_per_kind_and_user() {
        assert_eq!(
            history_key(AssistantKind::Chat, "  Ada@Example.com "),
            "edu-simplify:history:chat:ada@example.com"
        );
        assert_ne!(
            history_key(AssistantKind::Chat, "ada"),
            history_key(AssistantKind::Solver, "ada")
        );
    }

    #[test]
    fn test_blank_identity_is_guest() {
        assert_eq!(
            history_key(AssistantKind::Solver, "   "),
            "edu-simplify:history:solver:guest"
        );
    }
}
