//! Error classification and backoff policy
//!
//! Classification is primarily by HTTP status code; message text is consulted
//! only when no status is available (or the status matches no rule). The
//! marker table is shared by every call site so the mode-check and generate
//! calls cannot drift apart.

use cozeflow_config::BackoffConfig;
use std::time::Duration;

/// Transport/HTTP-layer failure kinds.
///
/// Normalization failures (`Api`, `Parse`, `NoOutput`) are separate
/// [`ClientError`](crate::ClientError) variants and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 429 or a rate-limit marker in the message
    RateLimit,
    /// 401 or an authentication-failure marker; never retried
    Auth,
    /// 5xx or a server-error marker
    Server,
    /// Network-level failure or timeout
    Network,
    /// Everything else
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Auth => write!(f, "auth"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// Upstream error text arrives in both English and Chinese.
const RATE_LIMIT_MARKERS: &[&str] = &["rate-limited", "频率限制"];
const AUTH_MARKERS: &[&str] = &["Unauthorized", "认证失败"];
const SERVER_MARKERS: &[&str] = &["服务器错误"];
const NETWORK_MARKERS: &[&str] = &["timeout", "网络"];

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

fn classify_message(message: &str) -> ErrorKind {
    if contains_any(message, RATE_LIMIT_MARKERS) {
        ErrorKind::RateLimit
    } else if contains_any(message, AUTH_MARKERS) {
        ErrorKind::Auth
    } else if contains_any(message, SERVER_MARKERS) {
        ErrorKind::Server
    } else if contains_any(message, NETWORK_MARKERS) {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown
    }
}

/// Classify a failed attempt from its status code and/or message text.
///
/// First match wins: 429 is a rate limit, 401 an auth failure, 500 and up
/// a server error, then the shared marker table in the same order, then
/// [`ErrorKind::Unknown`].
#[must_use]
pub fn classify(status: Option<u16>, message: &str) -> ErrorKind {
    if let Some(code) = status {
        match code {
            429 => return ErrorKind::RateLimit,
            401 => return ErrorKind::Auth,
            code if code >= 500 => return ErrorKind::Server,
            _ => {}
        }
    }
    classify_message(message)
}

/// Backoff delay before the next attempt: `base(kind) * (attempt_index + 1)`.
///
/// `attempt_index` is the zero-based index of the attempt that just failed,
/// so the delay grows strictly with each retry of the same kind.
#[must_use]
pub fn backoff_delay(kind: ErrorKind, attempt_index: u32, backoff: &BackoffConfig) -> Duration {
    let base_ms = match kind {
        ErrorKind::RateLimit => backoff.rate_limit_ms,
        ErrorKind::Server => backoff.server_error_ms,
        ErrorKind::Network => backoff.network_error_ms,
        ErrorKind::Auth | ErrorKind::Unknown => backoff.default_ms,
    };
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt_index) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_win_over_message_text() {
        assert_eq!(classify(Some(429), ""), ErrorKind::RateLimit);
        assert_eq!(classify(Some(401), ""), ErrorKind::Auth);
        assert_eq!(classify(Some(500), ""), ErrorKind::Server);
        assert_eq!(classify(Some(503), ""), ErrorKind::Server);
        // Status takes precedence even when the message suggests otherwise
        assert_eq!(classify(Some(429), "timeout"), ErrorKind::RateLimit);
        assert_eq!(classify(Some(502), "rate-limited"), ErrorKind::Server);
    }

    #[test]
    fn unmatched_status_falls_back_to_message() {
        assert_eq!(classify(Some(400), "rate-limited"), ErrorKind::RateLimit);
        assert_eq!(classify(Some(404), ""), ErrorKind::Unknown);
    }

    #[test]
    fn statusless_failures_classify_by_marker() {
        assert_eq!(classify(None, "request rate-limited"), ErrorKind::RateLimit);
        assert_eq!(classify(None, "请求过于频繁：频率限制"), ErrorKind::RateLimit);
        assert_eq!(classify(None, "Unauthorized"), ErrorKind::Auth);
        assert_eq!(classify(None, "API认证失败"), ErrorKind::Auth);
        assert_eq!(classify(None, "服务器错误"), ErrorKind::Server);
        assert_eq!(classify(None, "connect timeout"), ErrorKind::Network);
        assert_eq!(classify(None, "网络请求失败"), ErrorKind::Network);
        assert_eq!(classify(None, "something else"), ErrorKind::Unknown);
    }

    #[test]
    fn marker_rules_apply_in_taxonomy_order() {
        // A message matching several rules resolves to the earliest one
        assert_eq!(
            classify(None, "rate-limited after 网络 retry"),
            ErrorKind::RateLimit
        );
    }

    #[test]
    fn backoff_is_linear_in_attempt_index() {
        let backoff = BackoffConfig::default();
        let first = backoff_delay(ErrorKind::RateLimit, 0, &backoff);
        let second = backoff_delay(ErrorKind::RateLimit, 1, &backoff);
        let third = backoff_delay(ErrorKind::RateLimit, 2, &backoff);
        assert_eq!(first, Duration::from_millis(3_000));
        assert_eq!(second, Duration::from_millis(6_000));
        assert_eq!(third, Duration::from_millis(9_000));
    }

    #[test]
    fn backoff_bases_follow_error_kind() {
        let backoff = BackoffConfig::default();
        let rate = backoff_delay(ErrorKind::RateLimit, 0, &backoff);
        let server = backoff_delay(ErrorKind::Server, 0, &backoff);
        let network = backoff_delay(ErrorKind::Network, 0, &backoff);
        let unknown = backoff_delay(ErrorKind::Unknown, 0, &backoff);
        assert!(rate > server);
        assert!(server > network);
        assert_eq!(network, unknown);
    }
}
