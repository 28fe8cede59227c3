//! Domain layer of the Edu Simplify client.
//!
//! Holds the conversation and identity models, the durable key-value store
//! abstraction, client configuration and the shared error type. Nothing in
//! this crate performs network I/O.

pub mod assistant;
pub mod config;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod keys;
pub mod store;

// Re-export common types
pub use assistant::AssistantKind;
pub use error::{EduError, Result};
