//! Main error type for the Gemini streaming client.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;

/// Result type alias for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Top-level error type for the Gemini streaming integration.
///
/// Every variant is `Clone` so that a single stream failure can be handed to
/// both the live fragment stream and the aggregated response.
#[derive(Error, Debug, Clone)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

impl GeminiError {
    /// Returns true if a fresh request might succeed.
    ///
    /// Nothing in this crate retries; the flag is for the caller's request layer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::RateLimit(_)
                | GeminiError::Network(_)
                | GeminiError::Server(ServerError::ServiceUnavailable { .. })
        )
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeminiError::RateLimit(e) => e.retry_after(),
            _ => None,
        }
    }

    /// Returns true if the error came from decoding the response stream.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, GeminiError::Response(_))
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeminiError::Network(NetworkError::Timeout)
        } else {
            GeminiError::Network(NetworkError::ConnectionFailed {
                message: err.to_string(),
            })
        }
    }
}

impl From<serde_json::Error> for GeminiError {
    fn from(err: serde_json::Error) -> Self {
        GeminiError::Request(RequestError::Serialization {
            message: err.to_string(),
        })
    }
}

impl From<url::ParseError> for GeminiError {
    fn from(err: url::ParseError) -> Self {
        GeminiError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        let rate_limit = GeminiError::RateLimit(RateLimitError::TooManyRequests {
            retry_after: Some(Duration::from_secs(30)),
        });
        assert!(rate_limit.is_retryable());

        let auth_error = GeminiError::Authentication(AuthenticationError::InvalidApiKey);
        assert!(!auth_error.is_retryable());

        let malformed = GeminiError::Response(ResponseError::MalformedChunk {
            message: "expected value".to_string(),
            payload: "{oops".to_string(),
        });
        assert!(!malformed.is_retryable());
        assert!(malformed.is_stream_error());
    }

    #[test]
    fn test_json_error_is_a_request_error() {
        // Arrange
        let mut body = std::collections::HashMap::new();
        body.insert(vec![1u8], "value");
        let err = serde_json::to_vec(&body).unwrap_err();

        // Act
        let error: GeminiError = err.into();

        // Assert
        assert!(matches!(
            error,
            GeminiError::Request(RequestError::Serialization { .. })
        ));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let rate_limit = GeminiError::RateLimit(RateLimitError::TooManyRequests {
            retry_after: Some(Duration::from_secs(30)),
        });
        assert_eq!(rate_limit.retry_after(), Some(Duration::from_secs(30)));

        let config_error = GeminiError::Configuration(ConfigurationError::MissingApiKey);
        assert_eq!(config_error.retry_after(), None);
    }

    #[test]
    fn test_malformed_chunk_message_names_payload() {
        let error = GeminiError::Response(ResponseError::MalformedChunk {
            message: "expected value at line 1 column 1".to_string(),
            payload: "not json".to_string(),
        });
        assert!(error.to_string().contains("\"not json\""));
    }

    #[test]
    fn test_bad_finish_reason_message() {
        let with_message = ContentError::BadFinishReason {
            reason: "SAFETY".to_string(),
            message: Some("flagged".to_string()),
        };
        assert_eq!(with_message.to_string(), "Candidate was blocked due to SAFETY: flagged");

        let without = ContentError::BadFinishReason {
            reason: "RECITATION".to_string(),
            message: None,
        };
        assert_eq!(without.to_string(), "Candidate was blocked due to RECITATION");
    }
}
