//! Error category types for granular error handling.

use std::time::Duration;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Authentication-related errors.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },
}

/// Request rejected by the API before any stream was opened.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid model: {model}")]
    InvalidModel { model: String },

    /// The request body could not be encoded as JSON.
    #[error("Failed to serialize request: {message}")]
    Serialization { message: String },
}

/// Rate limiting errors.
#[derive(Error, Debug, Clone)]
pub enum RateLimitError {
    #[error("Too many requests")]
    TooManyRequests { retry_after: Option<Duration> },
}

impl RateLimitError {
    /// Returns the server-suggested delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitError::TooManyRequests { retry_after } => *retry_after,
        }
    }
}

/// Network-related errors.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out")]
    Timeout,
}

/// Server-side errors.
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },
}

/// Errors raised while turning the response body into fragments.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    /// A frame payload that is not a valid response object.
    #[error("Error parsing JSON response: {message}: \"{payload}\"")]
    MalformedChunk { message: String, payload: String },

    /// The stream closed while a frame was still open.
    #[error("Incomplete JSON segment at the end: \"{remainder}\"")]
    IncompleteFrame { remainder: String },

    /// The stream was torn down before it produced a result.
    #[error("Stream interrupted: {message}")]
    StreamInterrupted { message: String },
}

/// Errors raised by the response accessors when content is unavailable.
#[derive(Error, Debug, Clone)]
pub enum ContentError {
    #[error("Candidate was blocked due to {reason}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    BadFinishReason {
        reason: String,
        message: Option<String>,
    },

    #[error("Response was blocked due to {reason}")]
    PromptBlocked { reason: String },
}

/// Resource-related errors.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },
}
