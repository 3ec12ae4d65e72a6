//! HTTP contract tests for the Gemini provider against a local mock server.

use secrecy::Secret;
use serde_json::json;
use shop_finder_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use shop_finder_service::services::providers::{
    FinishReason, GenerationParams, ProviderError, TextProvider,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn provider(server: &MockServer, timeout: Duration) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        api_key: Secret::new("test-key".to_string()),
        model: "gemini-2.0-flash".to_string(),
        api_base: server.uri(),
        timeout,
    })
    .expect("Failed to build provider")
}

fn reply_with_parts(parts: &[&str], finish_reason: &str) -> serde_json::Value {
    let parts: Vec<_> = parts.iter().map(|t| json!({ "text": t })).collect();
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": finish_reason
        }],
        "usageMetadata": {
            "promptTokenCount": 120,
            "candidatesTokenCount": 45,
            "totalTokenCount": 165
        }
    })
}

#[tokio::test]
async fn generate_returns_text_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "find shops in Chennai" }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_with_parts(&["[{\"name\":", "\"A\"}]"], "STOP")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server, Duration::from_secs(5))
        .generate("find shops in Chennai", &GenerationParams::default())
        .await
        .expect("generate should succeed");

    assert_eq!(response.text, "[{\"name\":\"A\"}]");
    assert_eq!(response.input_tokens, 120);
    assert_eq!(response.output_tokens, 45);
    assert_eq!(response.finish_reason, FinishReason::Complete);
}

#[tokio::test]
async fn generate_sends_response_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_parts(&["[]"], "STOP")))
        .expect(1)
        .mount(&server)
        .await;

    let params = GenerationParams {
        output_schema: Some(json!({ "type": "ARRAY" })),
    };
    let response = provider(&server, Duration::from_secs(5))
        .generate("p", &params)
        .await
        .unwrap();

    assert_eq!(response.text, "[]");
}

#[tokio::test]
async fn rate_limit_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::RateLimited);
}

#[tokio::test]
async fn api_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": { "message": "API key not valid" } })),
        )
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(message) => {
            assert!(message.contains("403"), "{}", message);
            assert!(message.contains("API key not valid"), "{}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn safety_stop_is_content_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::ContentFiltered);
}

#[tokio::test]
async fn blocked_prompt_is_content_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "OTHER" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::ContentFiltered);
}

#[tokio::test]
async fn no_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::EmptyResponse);
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_with_parts(&["[]"], "STOP"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_millis(300))
        .generate("p", &GenerationParams::default())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Timeout);
}

#[tokio::test]
async fn health_check_fetches_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/gemini-2.0-flash"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "models/gemini-2.0-flash" })))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server, Duration::from_secs(5))
        .health_check()
        .await
        .expect("health check should pass");
}

#[tokio::test]
async fn health_check_fails_on_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/gemini-2.0-flash"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .health_check()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ApiError(_)));
}
