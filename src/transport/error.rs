//! Transport layer error types.

use bytes::Bytes;

use crate::error::{map_http_status, GeminiError, NetworkError, ResponseError};

/// Transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The request or the body read exceeded its deadline.
    #[error("Timeout")]
    Timeout,
    /// The request could not be sent or its rejection body could not be read.
    #[error("Request error: {0}")]
    Request(String),
    /// The server answered with a non-success status before streaming.
    #[error("HTTP error {status}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, usually a JSON error document.
        body: Bytes,
    },
    /// The body broke off after streaming had started.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl From<TransportError> for GeminiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(message) | TransportError::Request(message) => {
                GeminiError::Network(NetworkError::ConnectionFailed { message })
            }
            TransportError::Timeout => GeminiError::Network(NetworkError::Timeout),
            TransportError::Status { status, body } => map_http_status(status, &body),
            TransportError::Stream(message) => {
                GeminiError::Response(ResponseError::StreamInterrupted { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthenticationError;

    #[test]
    fn test_status_maps_through_error_mapper() {
        let err: GeminiError = TransportError::Status {
            status: 401,
            body: Bytes::from_static(b"{\"error\":{\"message\":\"API key not valid\"}}"),
        }
        .into();
        assert!(matches!(
            err,
            GeminiError::Authentication(AuthenticationError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_stream_error_is_stream_interrupted() {
        let err: GeminiError = TransportError::Stream("connection reset".to_string()).into();
        assert!(matches!(
            err,
            GeminiError::Response(ResponseError::StreamInterrupted { .. })
        ));
    }
}
