//! Integration tests for the reqwest transport against a mock server
//!
//! All tests use mocked responses and do not require API keys.

use quill_protocol::{TaskKind, ThinkingMode};
use quill_providers::{
    decode_reply, encode, system_prompt, ErrorKind, HttpTransport, PayloadLogger, ProviderConfig,
    Transport, TransportErrorKind,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(config: &ProviderConfig) -> HttpTransport {
    HttpTransport::new(config)
        .unwrap()
        .with_payload_logger(PayloadLogger::disabled())
}

#[tokio::test]
async fn test_posts_expected_wire_format() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(format!("{}/api/v3", server.uri()), "doubao-lite", "sk-test");

    Mock::given(method("POST"))
        .and(path("/api/v3/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "doubao-lite",
            "messages": [
                {"role": "system", "content": system_prompt(TaskKind::Translate)},
                {"role": "user", "content": "hello"}
            ],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "你好"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&config);
    let request = encode(
        &config.model,
        system_prompt(TaskKind::Translate),
        "hello",
        None,
    );

    let reply = transport
        .send(&config.auth_header(), &request)
        .await
        .unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(decode_reply(&reply).unwrap(), "你好");
}

#[tokio::test]
async fn test_thinking_switch_is_sent_when_configured() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(server.uri(), "m", "k").with_thinking(ThinkingMode::Disabled);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(wiremock::matchers::body_partial_json(json!({
            "thinking": {"type": "disabled"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&config);
    let request = encode(&config.model, "sys", "text", config.thinking);
    let reply = transport.send(&config.auth_header(), &request).await.unwrap();

    assert_eq!(decode_reply(&reply).unwrap(), "ok");
}

#[tokio::test]
async fn test_non_success_status_is_reported_not_raised() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(server.uri(), "m", "k");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "internal", "type": "server_error"}
        })))
        .mount(&server)
        .await;

    let transport = transport_for(&config);
    let request = encode(&config.model, "sys", "text", None);
    let reply = transport.send(&config.auth_header(), &request).await.unwrap();

    assert_eq!(reply.status, 500);
    let err = decode_reply(&reply).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessFailure);
    assert!(err.to_string().contains("internal"));
}

#[tokio::test]
async fn test_empty_success_body_is_absent() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(server.uri(), "m", "k");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = transport_for(&config);
    let request = encode(&config.model, "sys", "text", None);
    let reply = transport.send(&config.auth_header(), &request).await.unwrap();

    assert!(reply.body.is_none());
    assert_eq!(
        decode_reply(&reply).unwrap_err().kind(),
        ErrorKind::MalformedResponse
    );
}

#[tokio::test]
async fn test_timeout_is_a_transport_failure() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new(server.uri(), "m", "k").with_timeout_seconds(1);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let transport = transport_for(&config);
    let request = encode(&config.model, "sys", "text", None);
    let err = transport
        .send(&config.auth_header(), &request)
        .await
        .unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::Timeout);
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_failure() {
    // Port 9 (discard) is essentially never listening on loopback.
    let config = ProviderConfig::new("http://127.0.0.1:9", "m", "k").with_timeout_seconds(2);
    let transport = transport_for(&config);
    let request = encode(&config.model, "sys", "text", None);

    let result = transport.send(&config.auth_header(), &request).await;
    assert!(result.is_err());
}
