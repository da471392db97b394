// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion adapter against a mock HTTP server.

use rapport_config::model::CompletionConfig;
use rapport_core::{CompletionAdapter, CompletionRequest, RapportError};
use rapport_yandex::YandexCompletion;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(server: &MockServer) -> YandexCompletion {
    let config = CompletionConfig {
        api_key: Some("test-api-key".to_string()),
        folder_id: Some("b1gtest".to_string()),
        endpoint: format!("{}/foundationModels/v1/completion", server.uri()),
        timeout_secs: 1,
        ..CompletionConfig::default()
    };
    YandexCompletion::new(&config).unwrap()
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system_prompt: "Ты Юля, тебе 25 лет.".to_string(),
        user_text: "как дела?".to_string(),
        temperature: 0.6,
        max_tokens: 400,
    }
}

fn success_body(text: &str) -> serde_json::Value {
    json!({
        "result": {
            "alternatives": [
                {"message": {"role": "assistant", "text": text}, "status": "ALTERNATIVE_STATUS_FINAL"}
            ],
            "usage": {"inputTextTokens": "21", "completionTokens": "6", "totalTokens": "27"},
            "modelVersion": "23.10.2024"
        }
    })
}

#[tokio::test]
async fn complete_returns_first_alternative() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/foundationModels/v1/completion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("  Отлично, а у тебя? ")))
        .mount(&server)
        .await;

    let response = adapter(&server).complete(request()).await.unwrap();
    assert_eq!(response.text, "Отлично, а у тебя?");
    assert_eq!(response.model, "yandexgpt-lite@23.10.2024");
}

#[tokio::test]
async fn request_carries_auth_header_and_body_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/foundationModels/v1/completion"))
        .and(header("authorization", "Api-Key test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "modelUri": "gpt://b1gtest/yandexgpt-lite",
            "completionOptions": {"stream": false, "maxTokens": 400},
            "messages": [
                {"role": "system", "text": "Ты Юля, тебе 25 лет."},
                {"role": "user", "text": "как дела?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ок")))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(&server).complete(request()).await;
    assert!(result.is_ok(), "request should match: {result:?}");
}

#[tokio::test]
async fn non_success_status_is_transport_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server).complete(request()).await.unwrap_err();
    match err {
        RapportError::CompletionTransport { message, .. } => {
            assert!(message.contains("503"), "got: {message}");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let err = adapter(&server).complete(request()).await.unwrap_err();
    assert!(matches!(err, RapportError::CompletionTransport { .. }));
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server).complete(request()).await.unwrap_err();
    assert!(matches!(err, RapportError::CompletionMalformedResponse { .. }));
}

#[tokio::test]
async fn empty_alternatives_are_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"alternatives": []}})),
        )
        .mount(&server)
        .await;

    let err = adapter(&server).complete(request()).await.unwrap_err();
    assert!(matches!(err, RapportError::CompletionMalformedResponse { .. }));
}

#[tokio::test]
async fn slow_server_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body("поздно"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = adapter(&server).complete(request()).await.unwrap_err();
    assert!(matches!(err, RapportError::CompletionTimeout { .. }), "got: {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let config = CompletionConfig {
        api_key: Some("k".to_string()),
        folder_id: Some("f".to_string()),
        endpoint: "http://127.0.0.1:1/completion".to_string(),
        timeout_secs: 2,
        ..CompletionConfig::default()
    };
    let err = YandexCompletion::new(&config)
        .unwrap()
        .complete(request())
        .await
        .unwrap_err();
    assert!(matches!(err, RapportError::CompletionTransport { .. }), "got: {err:?}");
}
