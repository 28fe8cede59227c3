//! Multi-address HTTP client.
//!
//! The backend may be reachable through several base addresses (explicit
//! override, same host as the client, loopback). [`ResilientClient`] keeps one
//! of them active and only moves on when a request gets no response at all.
//! Once an address answers it stays active for later calls.

use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;

use edu_core::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_SECS, LOOPBACK_ADDRESSES};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::RequestError;

/// HTTP client with candidate-address fallback and bearer-token injection.
pub struct ResilientClient {
    http: Client,
    candidates: Vec<String>,
    active: RwLock<String>,
    token: RwLock<Option<String>>,
    timeout: Duration,
}

impl ResilientClient {
    /// Creates a client over `candidates` (priority order).
    ///
    /// An empty list falls back to the loopback addresses. The first
    /// candidate starts as the active address.
    pub fn new(candidates: Vec<String>, timeout: Duration) -> Self {
        let candidates = if candidates.is_empty() {
            LOOPBACK_ADDRESSES.iter().map(|a| a.to_string()).collect()
        } else {
            candidates
        };
        let active = candidates[0].clone();

        Self {
            http: Client::new(),
            candidates,
            active: RwLock::new(active),
            token: RwLock::new(None),
            timeout,
        }
    }

    /// Creates a client from the configured candidate addresses and timeout.
    pub fn from_config(config: &ClientConfig) -> Self {
        let timeout = if config.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            config.request_timeout_secs
        };
        Self::new(config.candidate_addresses(), Duration::from_secs(timeout))
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Address the next call will try first.
    pub fn active_address(&self) -> String {
        match self.active.read() {
            Ok(active) => active.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_active(&self, address: &str) {
        let mut active = match self.active.write() {
            Ok(active) => active,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *active != address {
            tracing::info!(from = %active.as_str(), to = address, "Switching API address");
            *active = address.to_string();
        }
    }

    /// Sets or clears the bearer token attached to every request.
    pub fn set_token(&self, token: Option<String>) {
        let mut current = match self.token.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = token.filter(|t| !t.trim().is_empty());
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Order in which addresses are tried: the active one first, then the
    /// remaining candidates in their configured order.
    pub fn probe_order(&self, allow_fallback: bool) -> Vec<String> {
        let active = self.active_address();
        if !allow_fallback {
            return vec![active];
        }

        std::iter::once(active.clone())
            .chain(self.candidates.iter().filter(|c| **c != active).cloned())
            .collect()
    }

    /// Builds a request against `base` with the auth header and timeout set.
    pub fn request(&self, method: Method, base: &str, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
        let mut builder = self.http.request(method, url).timeout(self.timeout);

        if let Some(token) = self.token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        builder
    }

    /// Runs `request_fn` against each address of the probe order.
    ///
    /// Returns on the first success, leaving that address active. A failure
    /// without a response moves on to the next address; any other failure is
    /// returned immediately. When every address fails, the last error is
    /// returned.
    pub async fn call<T, F, Fut>(&self, allow_fallback: bool, mut request_fn: F) -> Result<T, RequestError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let mut last_error = None;

        for address in self.probe_order(allow_fallback) {
            self.set_active(&address);

            match request_fn(address.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_connectivity() => {
                    tracing::warn!(address = %address, error = %e, "API address unreachable");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RequestError::connectivity(self.active_address(), "no candidate address")))
    }

    /// `GET path` decoded as JSON, with fallback.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.call(true, |base| {
            let builder = self.request(Method::GET, &base, path);
            async move { send_json(builder, &base).await }
        })
        .await
    }

    /// `POST path` with a JSON body, decoded as JSON, with fallback.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(true, |base| {
            let builder = self.request(Method::POST, &base, path).json(body);
            async move { send_json(builder, &base).await }
        })
        .await
    }

    /// `GET path?query` returning the raw body, with fallback.
    pub async fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, RequestError> {
        self.call(true, |base| {
            let builder = self.request(Method::GET, &base, path).query(query);
            async move { send_bytes(builder, &base).await }
        })
        .await
    }
}

/// Sends a request and decodes a JSON success body.
pub async fn send_json<T: DeserializeOwned>(builder: RequestBuilder, address: &str) -> Result<T, RequestError> {
    let response = send(builder, address).await?;
    response.json::<T>().await.map_err(|e| RequestError::Decode {
        address: address.to_string(),
        message: e.to_string(),
    })
}

/// Sends a request and returns the raw success body.
pub async fn send_bytes(builder: RequestBuilder, address: &str) -> Result<Vec<u8>, RequestError> {
    let response = send(builder, address).await?;
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| RequestError::Decode {
            address: address.to_string(),
            message: e.to_string(),
        })
}

async fn send(builder: RequestBuilder, address: &str) -> Result<reqwest::Response, RequestError> {
    let response = builder
        .send()
        .await
        .map_err(|e| classify_send_error(e, address))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::debug!(address, status = status.as_u16(), "API request rejected");
        return Err(RequestError::server(status.as_u16(), &text));
    }

    Ok(response)
}

/// Errors from `send()` never carry a response; only builder errors are not
/// connectivity problems.
fn classify_send_error(error: reqwest::Error, address: &str) -> RequestError {
    if error.is_builder() {
        RequestError::InvalidRequest(error.to_string())
    } else {
        RequestError::connectivity(address, error.to_string())
    }
}
