//! Integration tests for the Messages API client against a mock server

use journallm_common::generation::{AnthropicClient, GenerationSettings, ReportGenerator};
use journallm_common::Error;
use mockito::Matcher;
use serde_json::json;

fn client_for(server: &mockito::ServerGuard) -> AnthropicClient {
    let settings = GenerationSettings {
        base_url: server.url(),
        model: "test-model".to_string(),
        max_tokens: 123,
        ..GenerationSettings::default()
    };
    AnthropicClient::new("test-key", settings).unwrap()
}

#[tokio::test]
async fn test_report_is_prefill_plus_response_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "max_tokens": 123,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "content": [
                    { "type": "text", "text": "\n\n## Executive Summary\n\nRest well." }
                ],
                "usage": { "input_tokens": 10, "output_tokens": 5 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let report = client_for(&server).generate("<journal></journal>").await.unwrap();

    mock.assert_async().await;
    assert!(report.starts_with("# JournalLM Advice for "));
    assert!(report.ends_with("## Executive Summary\n\nRest well."));
}

#[tokio::test]
async fn test_request_carries_journal_and_prefill() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<journal><entry>marker</entry></journal>".to_string()),
            Matcher::Regex("# JournalLM Advice for".to_string()),
            Matcher::Regex(r#""role":"assistant""#.to_string()),
        ]))
        .with_status(200)
        .with_body(json!({ "content": [{ "type": "text", "text": "ok" }] }).to_string())
        .create_async()
        .await;

    client_for(&server)
        .generate("<journal><entry>marker</entry></journal>")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_surfaces_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(401)
        .with_body(
            json!({
                "type": "error",
                "error": { "type": "authentication_error", "message": "invalid x-api-key" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client_for(&server).generate("<journal/>").await.unwrap_err();
    match err {
        Error::GenerationServiceFailure(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid x-api-key"));
        }
        other => panic!("expected GenerationServiceFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_content_is_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(json!({ "content": [] }).to_string())
        .create_async()
        .await;

    let err = client_for(&server).generate("<journal/>").await.unwrap_err();
    assert!(matches!(err, Error::GenerationServiceFailure(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_failure() {
    let settings = GenerationSettings {
        // Reserved port, nothing listening
        base_url: "http://127.0.0.1:9".to_string(),
        ..GenerationSettings::default()
    };
    let client = AnthropicClient::new("k", settings).unwrap();
    let err = client.generate("<journal/>").await.unwrap_err();
    assert!(matches!(err, Error::GenerationServiceFailure(_)));
}
