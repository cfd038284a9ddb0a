//! Property-based tests for the classifier, backoff policy, and normalizer
//!
//! The envelope schema is untrusted by design, so the normalizer is probed
//! with arbitrary JSON rather than a fixed fixture set.

use cozeflow_client::{ClientError, ErrorKind, backoff_delay, classify, normalize};
use cozeflow_config::BackoffConfig;
use proptest::prelude::*;
use serde_json::{Value, json};

/// Arbitrary JSON values, shallow enough to keep cases readable
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ./:_-]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,10}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Envelopes that always pass the logical-success verdict
fn arb_success_envelope() -> impl Strategy<Value = Value> {
    arb_json().prop_map(|data| json!({ "msg": "Success", "data": data }))
}

proptest! {
    #[test]
    fn normalize_is_deterministic(envelope in arb_json()) {
        let first = normalize(&envelope);
        let second = normalize(&envelope);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(std::mem::discriminant(&a), std::mem::discriminant(&b));
            }
            _ => prop_assert!(false, "normalize verdict changed between runs"),
        }
    }

    #[test]
    fn normalize_ok_implies_logical_success(envelope in arb_json()) {
        if normalize(&envelope).is_ok() {
            let msg_success = envelope.get("msg").and_then(Value::as_str) == Some("Success");
            let code_success = envelope.get("code").and_then(Value::as_i64) == Some(0);
            prop_assert!(msg_success || code_success);
        }
    }

    #[test]
    fn success_envelopes_never_raise_api_error(envelope in arb_success_envelope()) {
        match normalize(&envelope) {
            Err(ClientError::Api(_)) => prop_assert!(false, "verdict passed but Api raised"),
            _ => {}
        }
    }

    #[test]
    fn classify_is_total(status in proptest::option::of(any::<u16>()), message in ".{0,64}") {
        // Any input classifies to some kind without panicking
        let _ = classify(status, &message);
    }

    #[test]
    fn status_codes_dominate_message_text(message in ".{0,64}") {
        prop_assert_eq!(classify(Some(429), &message), ErrorKind::RateLimit);
        prop_assert_eq!(classify(Some(401), &message), ErrorKind::Auth);
        prop_assert_eq!(classify(Some(500), &message), ErrorKind::Server);
        prop_assert_eq!(classify(Some(599), &message), ErrorKind::Server);
    }

    #[test]
    fn backoff_grows_strictly_with_attempts(attempt in 0u32..16) {
        let backoff = BackoffConfig::default();
        for kind in [
            ErrorKind::RateLimit,
            ErrorKind::Server,
            ErrorKind::Network,
            ErrorKind::Unknown,
        ] {
            let current = backoff_delay(kind, attempt, &backoff);
            let next = backoff_delay(kind, attempt + 1, &backoff);
            prop_assert!(next > current, "backoff must grow for {kind}");
        }
    }

    #[test]
    fn user_messages_stay_short(detail in ".{0,200}") {
        let message = ClientError::Api(detail).user_message();
        prop_assert!(message.chars().count() <= 33);
        prop_assert!(!message.is_empty());
    }
}
