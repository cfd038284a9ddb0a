//! Shared error taxonomy for the request pipeline
//!
//! Two layers share one enum: transport/HTTP failures (retryable per the
//! backoff policy) and normalization failures (a successful HTTP exchange
//! with an unusable payload; never retried).

use crate::classify::ErrorKind;
use thiserror::Error;

/// Maximum length of a user-visible message built from raw error text
const USER_MESSAGE_MAX_CHARS: usize = 30;

/// Failure surfaced to the caller of the pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 429 or rate-limit marker (transport layer, retryable)
    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// 401 or authentication-failure marker (transport layer, never retried)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 5xx or server-error marker (transport layer, retryable)
    #[error("Server error: {0}")]
    Server(String),

    /// Network-level failure or timeout (transport layer, retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// Unclassifiable transport-layer failure (retryable)
    #[error("Request failed: {0}")]
    Unknown(String),

    /// Envelope-level verdict was not a logical success
    #[error("API error: {0}")]
    Api(String),

    /// `data` carried a string that is not valid JSON
    #[error("Response parse failure: {0}")]
    Parse(String),

    /// Logical success without any result URL at a probed path
    #[error("No result URL found in response")]
    NoOutput,

    /// Client construction or configuration failure
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

impl ClientError {
    /// Build the transport-layer variant matching a classified kind.
    #[must_use]
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::RateLimit => Self::RateLimit(message),
            ErrorKind::Auth => Self::Auth(message),
            ErrorKind::Server => Self::Server(message),
            ErrorKind::Network => Self::Network(message),
            ErrorKind::Unknown => Self::Unknown(message),
        }
    }

    /// The classified kind for transport-layer variants, `None` otherwise.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::RateLimit(_) => Some(ErrorKind::RateLimit),
            Self::Auth(_) => Some(ErrorKind::Auth),
            Self::Server(_) => Some(ErrorKind::Server),
            Self::Network(_) => Some(ErrorKind::Network),
            Self::Unknown(_) => Some(ErrorKind::Unknown),
            _ => None,
        }
    }

    /// Whether the retry loop may attempt again after this failure.
    ///
    /// Auth failures never retry; normalization and configuration failures
    /// are outside the loop entirely.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self.kind(), Some(kind) if kind != ErrorKind::Auth)
    }

    /// Short status message suitable for an end user.
    ///
    /// Fixed strings per kind; messages built from raw error text are
    /// truncated. Full detail stays in the `Display` form for diagnostics.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimit(_) => "Too many requests, retry later".to_string(),
            Self::Auth(_) => "Authentication failed".to_string(),
            Self::Server(_) => "Server error, retry later".to_string(),
            Self::Network(_) => "Network error, check connection".to_string(),
            Self::Parse(_) => "Unexpected response format".to_string(),
            Self::NoOutput => "No image in response".to_string(),
            Self::Misconfiguration(_) => "Client is misconfigured".to_string(),
            Self::Api(msg) | Self::Unknown(msg) => truncate_user_message(msg),
        }
    }
}

fn truncate_user_message(message: &str) -> String {
    if message.is_empty() {
        return "Generation failed, retry".to_string();
    }
    if message.chars().count() <= USER_MESSAGE_MAX_CHARS {
        return message.to_string();
    }
    let truncated: String = message.chars().take(USER_MESSAGE_MAX_CHARS).collect();
    format!("{truncated}...")
}
