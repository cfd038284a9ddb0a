//! End-to-end pipeline tests over a scripted transport
//!
//! These exercise the full path the UI consumer sees: prompt in, normalized
//! result or classified error out, with the retry loop and normalizer
//! cooperating exactly as in production. Only the transport is substituted.

use cozeflow::{ClientError, Config, ErrorKind, WorkflowClient};
use cozeflow_client::test_support::ScriptedTransport;
use cozeflow_client::{TransportFailure, TransportResponse};
use serde_json::{Value, json};

fn test_config() -> Config {
    let mut config = Config::default();
    config.api.workflow_id = "wf-generate".to_string();
    config.api.mode_check_workflow_id = Some("wf-mode".to_string());
    config.api.app_id = "wx-app".to_string();
    // Keep retries fast; the loop sleeps for real
    config.backoff.rate_limit_ms = 2;
    config.backoff.server_error_ms = 2;
    config.backoff.network_error_ms = 1;
    config.backoff.default_ms = 1;
    config
}

fn client_over(transport: &ScriptedTransport) -> WorkflowClient {
    WorkflowClient::with_transport(test_config(), "pat_test".to_string(), transport.handle())
}

fn ok(body: Value) -> Result<TransportResponse, TransportFailure> {
    Ok(TransportResponse { status: 200, body })
}

fn status(code: u16, body: Value) -> Result<TransportResponse, TransportFailure> {
    Ok(TransportResponse { status: code, body })
}

#[tokio::test]
async fn generate_normalizes_string_data_envelope() {
    // data arrives as a JSON-encoded string
    let transport = ScriptedTransport::new(vec![ok(json!({
        "msg": "Success",
        "data": "{\"output\":\"https://x/1.jpg\",\"wenan\":\"c1\"}",
    }))]);
    let client = client_over(&transport);

    let result = client.generate("a red fox").await.expect("string data envelope");
    assert_eq!(result.url, "https://x/1.jpg");
    assert_eq!(result.caption, "c1");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn generate_falls_back_to_default_caption() {
    // object data without a caption candidate
    let transport = ScriptedTransport::new(vec![ok(json!({
        "code": 0,
        "data": { "output": "https://x/2.jpg" },
    }))]);
    let client = client_over(&transport);

    let result = client.generate("prompt").await.expect("caption fallback");
    assert_eq!(result.url, "https://x/2.jpg");
    assert_eq!(result.caption, "generation complete");
}

#[tokio::test]
async fn persistent_rate_limit_exhausts_retry_budget() {
    // 429 on every attempt with max_retries = 2: exactly 3 calls
    let transport = ScriptedTransport::repeating(status(429, json!({})));
    let mut config = test_config();
    config.api.max_retries = 2;
    let client = WorkflowClient::with_transport(config, "pat_test".to_string(), transport.handle());

    let err = client.generate("prompt").await.expect_err("rate limited");
    assert_eq!(err.kind(), Some(ErrorKind::RateLimit));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn auth_failure_stops_after_one_call() {
    // 401 with budget remaining: exactly 1 call
    let transport =
        ScriptedTransport::repeating(status(401, json!({ "message": "Unauthorized" })));
    let mut config = test_config();
    config.api.max_retries = 3;
    let client = WorkflowClient::with_transport(config, "pat_test".to_string(), transport.handle());

    let err = client.generate("prompt").await.expect_err("auth failure");
    assert_eq!(err.kind(), Some(ErrorKind::Auth));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn missing_url_surfaces_no_output_without_retry() {
    // normalization failures are never retried
    let transport = ScriptedTransport::repeating(ok(json!({
        "msg": "Success",
        "data": "{\"foo\":\"bar\"}",
    })));
    let client = client_over(&transport);

    let err = client.generate("prompt").await.expect_err("no output");
    assert!(matches!(err, ClientError::NoOutput));
    assert_eq!(transport.calls(), 1, "normalization errors must not retry");
}

#[tokio::test]
async fn api_error_carries_best_available_message() {
    let transport = ScriptedTransport::new(vec![ok(json!({
        "msg": "Failed",
        "message": "workflow suspended",
    }))]);
    let client = client_over(&transport);

    let err = client.generate("prompt").await.expect_err("api error");
    match err {
        ClientError::Api(msg) => assert_eq!(msg, "workflow suspended"),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn transient_server_error_recovers_on_retry() {
    let transport = ScriptedTransport::new(vec![
        status(502, json!({})),
        Err(TransportFailure {
            message: "connection reset".to_string(),
            timed_out: false,
        }),
        ok(json!({ "msg": "Success", "data": { "output": "https://x/9.jpg" } })),
    ]);
    let client = client_over(&transport);

    let result = client.generate("prompt").await.expect("third attempt wins");
    assert_eq!(result.url, "https://x/9.jpg");
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn mode_check_reads_the_mode_value() {
    let transport = ScriptedTransport::new(vec![ok(json!({
        "msg": "Success",
        "data": "{\"output\": 2}",
    }))]);
    let client = client_over(&transport);

    assert_eq!(client.check_mode().await, 2);
}

#[tokio::test]
async fn mode_check_degrades_to_default_on_failure() {
    let transport = ScriptedTransport::repeating(status(500, json!({})));
    let mut config = test_config();
    config.api.max_retries = 0;
    let client = WorkflowClient::with_transport(config, "pat_test".to_string(), transport.handle());

    assert_eq!(client.check_mode().await, 1);
}

#[tokio::test]
async fn mode_check_without_configured_workflow_degrades() {
    let transport = ScriptedTransport::repeating(ok(json!({})));
    let mut config = test_config();
    config.api.mode_check_workflow_id = None;
    let client = WorkflowClient::with_transport(config, "pat_test".to_string(), transport.handle());

    assert_eq!(client.check_mode().await, 1);
    assert_eq!(transport.calls(), 0, "no call without a configured workflow");
}
