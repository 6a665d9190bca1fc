//! OpenAiService against a mocked chat-completions endpoint.
//!
//! These tests use mockito to mock the provider's HTTP responses.

use ai_llm_service::{
    AiLlmError, CompletionClient, LlmModelConfig, LlmProvider, ResponseFormat,
    services::open_ai_service::OpenAiService,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn config_for(endpoint: &str) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: "gpt-5-nano".into(),
        endpoint: endpoint.into(),
        api_key: Some("sk-test".into()),
        max_tokens: None,
        temperature: None,
        connect_timeout_secs: Some(2),
        read_timeout_secs: Some(5),
        timeout_secs: Some(5),
    }
}

fn list_format() -> ResponseFormat {
    ResponseFormat::json_schema(
        "ad_copy_response",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "adTexts": { "type": "array", "items": { "type": "string" } } },
            "required": ["adTexts"]
        }),
    )
}

#[tokio::test]
async fn test_request_many_sends_n_schema_and_bearer() {
    let mut server = Server::new_async().await;

    let body = json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": "{\"adTexts\":[\"a\",\"b\",\"c\"]}" } },
            { "index": 1, "message": { "role": "assistant", "content": "{\"adTexts\":[\"d\",\"e\",\"f\"]}" } }
        ]
    });

    let m = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-5-nano",
            "n": 5,
            "messages": [{ "role": "user", "content": "write three" }],
            "response_format": { "type": "json_schema", "json_schema": { "name": "ad_copy_response", "strict": true } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&server.url())).expect("service");
    let res = svc
        .request_many("write three", &list_format(), 5)
        .await
        .expect("completion");

    m.assert_async().await;
    assert_eq!(res.status, 200);
    assert_eq!(res.error_message, None);
    // Fewer choices than requested is tolerated.
    assert_eq!(res.contents.len(), 2);
    assert!(res.contents[1].contains("\"d\""));
}

#[tokio::test]
async fn test_error_envelope_passes_message_through() {
    let mut server = Server::new_async().await;

    let _m = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"rate limited","type":"rate_limit_exceeded"}}"#)
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&server.url())).expect("service");
    let res = svc
        .request_one("prompt", &list_format())
        .await
        .expect("completion");

    assert_eq!(res.status, 429);
    assert_eq!(res.error_message.as_deref(), Some("rate limited"));
    assert_eq!(res.content, None);
}

#[tokio::test]
async fn test_malformed_envelope_is_empty_not_error() {
    let mut server = Server::new_async().await;

    let _m = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("upstream hiccup")
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&server.url())).expect("service");
    let res = svc
        .request_many("prompt", &list_format(), 3)
        .await
        .expect("completion");

    assert_eq!(res.status, 200);
    assert!(res.contents.is_empty());
    assert_eq!(res.error_message, None);
}

#[tokio::test]
async fn test_trailing_slash_endpoint_is_normalized() {
    let mut server = Server::new_async().await;

    let m = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"{\"adText\":\"x\"}"}}]}"#)
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&format!("{}/", server.url()))).expect("service");
    let res = svc
        .request_one("prompt", &list_format())
        .await
        .expect("completion");

    m.assert_async().await;
    assert_eq!(res.content.as_deref(), Some("{\"adText\":\"x\"}"));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Port 9 (discard) is closed on test hosts; the connect fails fast.
    let svc = OpenAiService::new(config_for("http://127.0.0.1:9")).expect("service");
    let err = svc
        .request_many("prompt", &list_format(), 1)
        .await
        .expect_err("connection must fail");

    assert!(matches!(
        err,
        AiLlmError::HttpTransport(_) | AiLlmError::Timeout(_)
    ));
}

#[tokio::test]
async fn test_probe_models_uses_pooled_client_headers() {
    let mut server = Server::new_async().await;

    let m = server
        .mock("GET", "/v1/models")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"object":"list","data":[{"id":"gpt-4o"},{"id":"gpt-5-nano"}]}"#)
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&format!("{}/", server.url()))).expect("service");
    let health = svc.probe_models().await;

    m.assert_async().await;
    assert!(health.ok, "{health:?}");
    assert_eq!(health.model, "gpt-5-nano");
    assert_eq!(health.provider, "OpenAI");
}

#[tokio::test]
async fn test_probe_models_reports_undecodable_listing() {
    let mut server = Server::new_async().await;

    let _m = server
        .mock("GET", "/v1/models")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let svc = OpenAiService::new(config_for(&server.url())).expect("service");
    let health = svc.probe_models().await;

    assert!(!health.ok);
    assert!(health.message.contains("decode error"), "{}", health.message);
}

#[tokio::test]
async fn test_probe_models_never_fails_on_refused_connection() {
    let svc = OpenAiService::new(config_for("http://127.0.0.1:9")).expect("service");
    let health = svc.probe_models().await;

    assert!(!health.ok);
    assert!(!health.message.is_empty());
    assert_eq!(health.endpoint, "http://127.0.0.1:9");
}
