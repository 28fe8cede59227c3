//! Application layer for the Edu Simplify client.
//!
//! Coordinates the domain model (`edu-core`) and the remote service
//! (`edu-interaction`) into the flows the front end drives:
//!
//! - [`ConversationHistory`]: bounded, persisted conversation list per user and assistant
//! - [`ChatController`]: optimistic send / fail / retry over one assistant
//! - [`IdentityContext`]: bearer token and profile, revalidated once per process
//! - [`StudySession`]: facade wiring the above to the durable store

pub mod chat;
pub mod history;
pub mod identity;
pub mod study;

pub use chat::{AssistantBackend, ChatController, ContextualChat, SendOutcome, SolverChat};
pub use history::ConversationHistory;
pub use identity::IdentityContext;
pub use study::{StudyContext, StudyError, StudySession};
