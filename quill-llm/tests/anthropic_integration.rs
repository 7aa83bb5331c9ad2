mod common;

use quill_llm::anthropic::AnthropicClient;
use quill_llm::traits::{ChatMessage, LlmClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages_body(blocks: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "msg_01TestResponse",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-latest",
        "content": blocks,
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 42, "output_tokens": 17 }
    })
}

fn client_for(server: &MockServer) -> AnthropicClient {
    AnthropicClient::with_base_url(
        "test-key-123".to_string(),
        "claude-3-5-sonnet-latest".to_string(),
        &server.uri(),
    )
    .unwrap()
}

#[tokio::test]
async fn chat_sends_auth_headers_and_extracts_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key-123"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-latest",
            "max_tokens": 256
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(json!([
            { "type": "text", "text": "Short sentences carry your voice." }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("Analyze my style")];
    let resp = client.chat(&messages, None, 256).await.unwrap();

    assert_eq!(resp.text, "Short sentences carry your voice.");
    assert_eq!(resp.model.as_deref(), Some("claude-3-5-sonnet-latest"));
    assert_eq!(resp.tokens_used, Some(59));
}

#[tokio::test]
async fn chat_forwards_system_prompt() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "system": "You are a helpful writing coach."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(json!([
            { "type": "text", "text": "Happy to help." }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("hello")];
    let resp = client
        .chat(&messages, Some("You are a helpful writing coach."), 64)
        .await
        .unwrap();

    assert_eq!(resp.text, "Happy to help.");
}

#[tokio::test]
async fn response_without_text_block_is_an_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(json!([
            { "type": "tool_use", "id": "toolu_01", "name": "lookup", "input": {} }
        ]))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("hello")];
    let err = client.chat(&messages, None, 64).await.unwrap_err();

    assert!(err
        .to_string()
        .contains("unexpected response type from model"));
}

#[tokio::test]
async fn api_error_envelope_message_is_surfaced() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {
                "type": "authentication_error",
                "message": "invalid x-api-key"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("hello")];
    let err = client.chat(&messages, None, 64).await.unwrap_err();

    assert!(err.to_string().contains("invalid x-api-key"));
}

#[tokio::test]
async fn health_check_maps_failure_to_false() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.health_check().await.unwrap());

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_body(json!([
            { "type": "text", "text": "OK" }
        ]))))
        .mount(&server)
        .await;

    assert!(client.health_check().await.unwrap());
}
