//! Full request path: orchestrator, reqwest transport and a mock HTTP server

use quill_protocol::TaskKind;
use quill_providers::{AiError, ProviderConfig};
use quill_runtime::{Orchestrator, OrchestratorConfig};
use serde_json::json;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new(format!("{}/api/v3", server.uri()), "doubao-test", "sk-test")
        .with_timeout_seconds(5)
}

fn quick_retries() -> OrchestratorConfig {
    OrchestratorConfig {
        retry_enabled: true,
        max_retry_count: 2,
        retry_delay_ms: 20,
    }
}

#[tokio::test]
async fn test_retries_through_a_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "service busy", "type": "overloaded"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "你好，世界"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::builder(config_for(&server))
        .config(quick_retries())
        .build()
        .unwrap();
    let (tx, rx) = oneshot::channel::<Result<String, AiError>>();

    orchestrator
        .process("Hello, world", TaskKind::Translate, tx)
        .unwrap();

    let reply = tokio::time::timeout(Duration::from_secs(10), rx)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reply, "你好，世界");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["model"], "doubao-test");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][1]["content"], "Hello, world");
}

#[tokio::test]
async fn test_persistent_error_is_exhausted_with_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "invalid api key", "type": "unauthorized"}
        })))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::builder(config_for(&server))
        .config(quick_retries())
        .build()
        .unwrap();
    let (tx, rx) = oneshot::channel::<Result<String, AiError>>();

    orchestrator.process("text", TaskKind::Polish, tx).unwrap();

    let error = tokio::time::timeout(Duration::from_secs(10), rx)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(error.to_string().starts_with("failed after 2 retries:"));
    match error.last_failure() {
        AiError::BusinessFailure { status, message } => {
            assert_eq!(*status, 401);
            assert!(message.contains("invalid api key"));
        }
        other => panic!("unexpected last failure: {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
