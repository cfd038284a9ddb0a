//! Transport seam for the request pipeline
//!
//! The orchestrator posts through the [`Transport`] trait and never touches
//! `reqwest` directly. A transport resolves with a status code and decoded
//! body, or rejects with a network-level failure; status handling and retry
//! decisions stay in the executor.

use crate::error::ClientError;
use crate::redact::redact_error_message;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default connect timeout (30 seconds)
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept header sent with every workflow call
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// One outgoing workflow POST, immutable across retry attempts.
#[derive(Clone)]
pub struct TransportRequest {
    /// Workflow run endpoint
    pub url: String,
    /// Bearer credential for the Authorization header
    pub bearer_token: String,
    /// JSON-encoded request body
    pub body: Value,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRequest")
            .field("url", &self.url)
            .field("bearer_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// A completed HTTP exchange, successful or not at the HTTP level.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded body. Non-JSON bodies are carried as a JSON string so the
    /// executor can still reject them as an invalid response shape.
    pub body: Value,
}

/// Network-level rejection: the exchange never produced a status code.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    /// Human-readable failure text, already redacted
    pub message: String,
    /// Whether the request timed out
    pub timed_out: bool,
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Capability the orchestrator invokes for a single HTTP POST.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP POST with headers, JSON body, and a timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportFailure` only for network-level problems (DNS,
    /// connect, timeout). Non-200 statuses resolve normally.
    async fn post(&self, request: &TransportRequest) -> Result<TransportResponse, TransportFailure>;
}

/// Production transport over a pooled `reqwest` client.
///
/// The client is built once and shared across calls. No `User-Agent` header
/// is ever set: the originating mini-program host rejects requests that
/// carry one, and the remote service does not require it.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
}

impl HttpTransport {
    /// Build the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Misconfiguration` if the client cannot be
    /// constructed.
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                ClientError::Misconfiguration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let response = self
            .client
            .post(&request.url)
            .bearer_auth(&request.bearer_token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_VALUE)
            .json(&request.body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| TransportFailure {
                timed_out: e.is_timeout(),
                message: redact_error_message(&e.to_string()),
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| TransportFailure {
            timed_out: e.is_timeout(),
            message: redact_error_message(&e.to_string()),
        })?;

        // Tolerate non-JSON bodies; the executor decides what they mean.
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        debug!(status, "workflow POST completed");

        Ok(TransportResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_transport_construction() {
        let transport = HttpTransport::new();
        assert!(transport.is_ok(), "should construct HTTP transport");
    }

    #[test]
    fn transport_failure_displays_message() {
        let failure = TransportFailure {
            message: "connect timeout".to_string(),
            timed_out: true,
        };
        assert_eq!(failure.to_string(), "connect timeout");
    }
}
