//! Response normalization over an untrusted envelope
//!
//! The remote service wraps its payload under varying, inconsistent field
//! names. Field probing walks explicit candidate path tables, first present
//! non-null value wins, so the order is testable and extensible without
//! touching the extraction code.

use crate::error::ClientError;
use serde_json::Value;
use std::borrow::Cow;

/// Caption used when no caption candidate resolves
pub const DEFAULT_CAPTION: &str = "generation complete";

/// URL candidate paths, probed in order
pub const URL_CANDIDATES: &[&[&str]] = &[
    &["output"],
    &["image_url"],
    &["url"],
    &["result", "output"],
    &["result", "image_url"],
];

/// Caption candidate paths, probed in order
pub const CAPTION_CANDIDATES: &[&[&str]] = &[
    &["response_for_model"],
    &["wenan"],
    &["text"],
    &["description"],
    &["result", "text"],
];

/// Mode-value candidate paths for the mode-check workflow
const MODE_CANDIDATES: &[&[&str]] = &[&["output"], &["mode"], &["result"], &["value"]];

/// The two semantically-named outputs of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResult {
    /// Result image URL; mandatory for the call to count as successful
    pub url: String,
    /// Caption text, falling back to [`DEFAULT_CAPTION`]
    pub caption: String,
}

/// Walk candidate paths; the first present non-null value wins.
fn probe<'a>(payload: &'a Value, candidates: &[&[&str]]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| {
        path.iter()
            .try_fold(payload, |value, key| value.get(key))
            .filter(|value| !value.is_null())
    })
}

/// Render a probed scalar as a string; objects and arrays are not answers.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Envelope-level verdict, distinct from HTTP-level success.
fn is_logical_success(envelope: &Value) -> bool {
    envelope.get("msg").and_then(Value::as_str) == Some("Success")
        || envelope.get("code").and_then(Value::as_i64) == Some(0)
}

/// Best-available error message from a failed envelope.
fn api_error_message(envelope: &Value) -> String {
    for field in ["message", "error", "msg"] {
        if let Some(text) = envelope.get(field).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    "API returned an unknown error".to_string()
}

/// Locate the real payload inside the envelope.
///
/// `data` may be a JSON-encoded string, an object, or absent entirely, in
/// which case top-level fields may carry the answer directly.
fn extract_payload(envelope: &Value) -> Result<Cow<'_, Value>, ClientError> {
    match envelope.get("data") {
        Some(Value::String(raw)) => serde_json::from_str(raw)
            .map(Cow::Owned)
            .map_err(|e| ClientError::Parse(e.to_string())),
        Some(data @ Value::Object(_)) => Ok(Cow::Borrowed(data)),
        _ => Ok(Cow::Borrowed(envelope)),
    }
}

/// Extract the success verdict and output values from a raw envelope.
///
/// # Errors
///
/// - `ClientError::Api` when the envelope is not a logical success
/// - `ClientError::Parse` when `data` is a string that is not valid JSON
/// - `ClientError::NoOutput` when no URL candidate resolves
pub fn normalize(envelope: &Value) -> Result<NormalizedResult, ClientError> {
    if !is_logical_success(envelope) {
        return Err(ClientError::Api(api_error_message(envelope)));
    }

    let payload = extract_payload(envelope)?;

    let url = probe(&payload, URL_CANDIDATES)
        .and_then(scalar_to_string)
        .ok_or(ClientError::NoOutput)?;

    let caption = probe(&payload, CAPTION_CANDIDATES)
        .and_then(scalar_to_string)
        .unwrap_or_else(|| DEFAULT_CAPTION.to_string());

    Ok(NormalizedResult { url, caption })
}

/// Interpret a mode-check envelope, degrading to mode 1 on any miss.
///
/// The mode check is best-effort: a failed verdict, unparsable payload, or
/// absent mode value all mean the default mode.
#[must_use]
pub fn extract_mode(envelope: &Value) -> i64 {
    if !is_logical_success(envelope) {
        return 1;
    }
    let payload = match extract_payload(envelope) {
        Ok(payload) => payload,
        Err(_) => return 1,
    };
    probe(&payload, MODE_CANDIDATES)
        .and_then(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(1)
}
