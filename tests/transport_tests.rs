//! End-to-end tests of the reqwest transport against a local HTTP server.

use integrations_gemini_stream::mocks::sse_body;
use integrations_gemini_stream::services::{ContentService, ContentServiceImpl};
use integrations_gemini_stream::types::GenerateContentRequest;
use integrations_gemini_stream::{AuthenticationError, GeminiConfig, GeminiError};
use futures::StreamExt;
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STREAM_PATH: &str = "/v1beta/models/gemini-pro:streamGenerateContent";

fn create_service(server: &MockServer) -> ContentServiceImpl {
    let config = GeminiConfig::builder()
        .api_key(SecretString::new("test-key".into()))
        .base_url(&server.uri())
        .unwrap()
        .timeout(Duration::from_secs(10))
        .enable_logging(false)
        .build()
        .unwrap();

    ContentServiceImpl::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_streams_sse_body_over_http() {
    // Arrange
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"candidates":[{"index":0,"content":{"role":"model","parts":[{"text":"Hello"}]}}]}"#,
        r#"{"candidates":[{"index":0,"content":{"role":"model","parts":[{"text":"Hello there"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":3,"totalTokenCount":7}}"#,
    ]);

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);

    // Act
    let mut result = service
        .generate_content_stream("gemini-pro", GenerateContentRequest::from_text("Hi"))
        .await
        .unwrap();

    let mut fragments = Vec::new();
    while let Some(fragment) = result.stream.next().await {
        fragments.push(fragment.unwrap());
    }
    let response = result.response.await.unwrap();

    // Assert
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].text().unwrap(), "Hello");
    assert_eq!(response.text().unwrap(), "Hello there");
    assert_eq!(response.usage_metadata().unwrap().total_token_count, 7);
}

#[tokio::test]
async fn test_error_status_is_mapped_before_streaming() {
    // Arrange
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"{"error":{"code":403,"message":"API key not valid for this project","status":"PERMISSION_DENIED"}}"#,
        ))
        .mount(&server)
        .await;

    let service = create_service(&server);

    // Act
    let result = service
        .generate_content_stream("gemini-pro", GenerateContentRequest::from_text("Hi"))
        .await;

    // Assert
    match result {
        Err(GeminiError::Authentication(AuthenticationError::PermissionDenied { message })) => {
            assert_eq!(message, "API key not valid for this project");
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("expected an error"),
    }
}
