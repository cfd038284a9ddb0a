//! Request orchestration: the timed retry loop around the transport
//!
//! The executor drives one logical call to completion: post, classify the
//! failure, back off, retry. It returns the raw response envelope; pulling
//! the result URL and caption out of it is the normalizer's job.

use crate::classify::{ErrorKind, backoff_delay, classify};
use crate::error::ClientError;
use crate::redact::redact_error_message;
use crate::transport::{Transport, TransportRequest};
use cozeflow_config::BackoffConfig;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Retry budget for one logical call.
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// Retry ceiling: at most `max_retries + 1` physical attempts
    pub max_retries: u32,
    /// When false, any failure surfaces immediately
    pub retry_enabled: bool,
}

impl RetryOptions {
    /// Take the budget from configuration.
    #[must_use]
    pub fn from_config(api: &cozeflow_config::ApiConfig) -> Self {
        Self {
            max_retries: api.max_retries,
            retry_enabled: api.retry_enabled,
        }
    }
}

/// Drives the retry loop for workflow calls over an injected transport.
pub struct Executor {
    transport: Arc<dyn Transport>,
    backoff: BackoffConfig,
}

impl Executor {
    /// Create an executor over the given transport and backoff bases.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, backoff: BackoffConfig) -> Self {
        Self { transport, backoff }
    }

    /// Execute one logical call, retrying per the backoff policy.
    ///
    /// Returns the raw envelope from the first attempt that yields HTTP 200
    /// with an object body. Exactly one envelope or one error is the outcome,
    /// after at most `max_retries + 1` attempts.
    ///
    /// # Errors
    ///
    /// Returns the last classified `ClientError` when the budget is
    /// exhausted, retries are disabled, or an auth failure short-circuits
    /// the loop.
    pub async fn execute(
        &self,
        request: &TransportRequest,
        options: &RetryOptions,
    ) -> Result<Value, ClientError> {
        let mut attempt_index: u32 = 0;
        let mut last_error: Option<ClientError> = None;

        debug!(
            max_retries = options.max_retries,
            retry_enabled = options.retry_enabled,
            "starting workflow call"
        );

        while attempt_index <= options.max_retries {
            let started = Instant::now();
            let outcome = self.transport.post(request).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let error = match outcome {
                Ok(response) if response.status == 200 => {
                    if response.body.is_object() {
                        debug!(
                            attempt = attempt_index + 1,
                            duration_ms, "workflow call succeeded"
                        );
                        return Ok(response.body);
                    }
                    // HTTP succeeded but the body is unusable; still a failed attempt
                    ClientError::Unknown("invalid response shape".to_string())
                }
                Ok(response) => {
                    let message = response
                        .body
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    let kind = classify(Some(response.status), message);
                    let detail = if message.is_empty() {
                        format!("HTTP {}", response.status)
                    } else {
                        format!("HTTP {}: {}", response.status, message)
                    };
                    ClientError::from_kind(kind, detail)
                }
                Err(failure) => ClientError::Network(format!(
                    "network request failed: {}",
                    redact_error_message(&failure.message)
                )),
            };

            let kind = error.kind().unwrap_or(ErrorKind::Unknown);
            warn!(
                attempt = attempt_index + 1,
                kind = %kind,
                duration_ms,
                error = %error,
                "workflow call attempt failed"
            );

            let stop = !options.retry_enabled
                || kind == ErrorKind::Auth
                || attempt_index >= options.max_retries;
            last_error = Some(error);

            if stop {
                break;
            }

            let delay = backoff_delay(kind, attempt_index, &self.backoff);
            debug!(
                delay_ms = delay.as_millis() as u64,
                next_attempt = attempt_index + 2,
                "backing off before retry"
            );
            tokio::time::sleep(delay).await;
            attempt_index += 1;
        }

        Err(last_error.unwrap_or_else(|| ClientError::Unknown("request failed".to_string())))
    }
}
