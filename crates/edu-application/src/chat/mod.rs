//! Session-scoped chat controllers.

mod backend;
mod controller;

pub use backend::{AssistantBackend, ContextualChat, SolverChat, IMAGE_ONLY_PROMPT};
pub use controller::{ChatController, SendOutcome, HISTORY_WINDOW};
