//! Mock implementations for testing.
//!
//! [`MockHttpTransport`] replays scripted response bodies chunk by chunk and
//! records every request, so the content service and the streaming pipeline
//! can be exercised without a network.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use futures::stream;

use crate::transport::{HttpTransport, HttpRequest, HttpMethod, ChunkedStream, TransportError};

/// One scripted reply: either a rejected request or a body to replay.
type ScriptedReply = Result<Vec<Result<Bytes, TransportError>>, TransportError>;

/// Mock HTTP transport for testing.
///
/// # Example
///
/// ```
/// use integrations_gemini_stream::mocks::MockHttpTransport;
/// use integrations_gemini_stream::transport::{HttpTransport, HttpRequest, HttpMethod};
/// use futures::StreamExt;
/// use std::collections::HashMap;
///
/// # tokio_test::block_on(async {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_sse_response(&[r#"{"candidates": []}"#]);
///
/// let request = HttpRequest {
///     method: HttpMethod::Post,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let mut body = transport.send_streaming(request).await.unwrap();
/// assert!(body.next().await.is_some());
/// transport.verify_request_count(1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

/// Lock a mock's state. A panicking test must not poison the other
/// assertions, so poisoned locks are recovered.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Render payloads as `data: ` frames, each terminated by a blank line.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {}\n\n", payload))
        .collect()
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a body delivered as the given chunks.
    pub fn enqueue_streaming_response(&self, chunks: Vec<Bytes>) {
        lock(&self.replies).push_back(Ok(chunks.into_iter().map(Ok).collect()));
    }

    /// Enqueue a body made of one frame per payload, delivered in one chunk.
    pub fn enqueue_sse_response(&self, payloads: &[&str]) {
        self.enqueue_streaming_response(vec![Bytes::from(sse_body(payloads))]);
    }

    /// Enqueue a body whose chunks may include failures part way through.
    pub fn enqueue_streaming_script(&self, chunks: Vec<Result<Bytes, TransportError>>) {
        lock(&self.replies).push_back(Ok(chunks));
    }

    /// Enqueue a failure returned before any body is produced.
    pub fn enqueue_error(&self, error: TransportError) {
        lock(&self.replies).push_back(Err(error));
    }

    /// Enqueue a rejection with the given status and body.
    pub fn enqueue_status(&self, status: u16, body: &str) {
        self.enqueue_error(TransportError::Status {
            status,
            body: Bytes::from(body.to_string()),
        });
    }

    /// Get all requests that were made.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = lock(&self.requests).len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    /// Verify that a request was made with the expected method and URL.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Verify that a request contains a specific header.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = lock(&self.requests);
        assert!(index < requests.len(), "No request at index {}", index);

        let actual_value = requests[index].headers.get(header_name);
        assert_eq!(
            actual_value.map(String::as_str),
            Some(header_value),
            "Expected header '{}' to be '{}'",
            header_name,
            header_value
        );
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send_streaming(&self, request: HttpRequest) -> Result<ChunkedStream, TransportError> {
        lock(&self.requests).push(request);

        let reply = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| TransportError::Request("No mock response enqueued".to_string()))?;

        let chunks = reply?;
        Ok(Box::pin(stream::iter(chunks)))
    }
}
