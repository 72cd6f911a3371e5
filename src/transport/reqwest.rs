//! Reqwest-based HTTP transport implementation.

use super::http::{HttpTransport, HttpRequest, HttpMethod, ChunkedStream};
use super::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use futures::StreamExt;

/// Reqwest-based HTTP transport.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport.
    ///
    /// `timeout` bounds the whole exchange, including reading the streamed
    /// body, so it should cover the longest expected generation.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Convert HttpMethod to reqwest::Method.
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    /// Convert headers HashMap to reqwest::header::HeaderMap.
    fn convert_headers(headers: HashMap<String, String>) -> reqwest::header::HeaderMap {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(&value),
            ) {
                header_map.insert(name, val);
            }
        }
        header_map
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send_streaming(&self, request: HttpRequest) -> Result<ChunkedStream, TransportError> {
        let method = Self::convert_method(request.method);
        let headers = Self::convert_headers(request.headers);

        let mut req_builder = self.client
            .request(method, &request.url)
            .headers(headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.bytes().await
                .map_err(|e| TransportError::Request(format!("Failed to read error response: {}", e)))?;
            tracing::debug!(status, "Streaming request rejected");
            return Err(TransportError::Status { status, body });
        }

        let stream = response.bytes_stream();
        let mapped_stream = Box::pin(stream.map(|result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Stream(e.to_string())
                }
            })
        }));

        Ok(mapped_stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_creation() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        assert!(transport.is_ok());
    }

    #[test]
    fn test_convert_method() {
        assert_eq!(ReqwestTransport::convert_method(HttpMethod::Post), reqwest::Method::POST);
    }

    #[test]
    fn test_convert_headers_skips_invalid() {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "text/event-stream".to_string());
        headers.insert("bad header".to_string(), "x".to_string());
        let converted = ReqwestTransport::convert_headers(headers);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted["accept"], "text/event-stream");
    }
}
