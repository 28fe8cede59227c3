//! Remote service access for the Edu Simplify client.
//!
//! - `client`: [`ResilientClient`], multi-address HTTP client with sticky fallback
//! - `error`: [`RequestError`] and its projection to user-facing text
//! - `dto`: request/response payloads of the remote service
//! - `api`: [`EduApi`], one typed method per endpoint

pub mod api;
pub mod client;
pub mod dto;
pub mod error;

pub use api::{AssistantApi, AuthApi, EduApi};
pub use client::ResilientClient;
pub use error::RequestError;
