//! Client configuration model.
//!
//! Loading from disk lives in `edu-infrastructure`; this module only defines
//! the shape, defaults and the derived list of candidate server addresses.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Port the backend listens on when reached through a host name.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Per-attempt request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Loopback addresses always tried after the configured ones.
pub const LOOPBACK_ADDRESSES: [&str; 2] = ["http://127.0.0.1:8000", "http://localhost:8000"];

/// Configuration root (`config.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Explicit backend address, tried first.
    pub api_base_url: Option<String>,
    /// Host the client was served from; combined with `api_port`.
    pub origin_host: Option<String>,
    pub api_port: u16,
    pub request_timeout_secs: u64,
    /// Directory of the file-backed durable store.
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            origin_host: None,
            api_port: DEFAULT_API_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage_dir: None,
        }
    }
}

impl ClientConfig {
    /// Candidate base addresses in priority order.
    ///
    /// Configured override, then `http://<origin_host>:<api_port>`, then the
    /// loopback addresses. Trailing slashes are trimmed, blanks skipped and
    /// duplicates removed keeping the first occurrence.
    pub fn candidate_addresses(&self) -> Vec<String> {
        let same_origin = self
            .origin_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(|host| format!("http://{}:{}", host, self.api_port));

        let candidates = self
            .api_base_url
            .iter()
            .cloned()
            .chain(same_origin)
            .chain(LOOPBACK_ADDRESSES.iter().map(|a| a.to_string()));

        let mut addresses: Vec<String> = Vec::new();
        for candidate in candidates {
            let trimmed = candidate.trim().trim_end_matches('/').to_string();
            if !trimmed.is_empty() && !addresses.contains(&trimmed) {
                addresses.push(trimmed);
            }
        }
        addresses
    }
}
