//! Error mapping for HTTP failures on the streaming endpoint.

use serde::Deserialize;
use super::categories::*;
use super::types::GeminiError;

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detailed error information from API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Maps an HTTP status code and response body to a `GeminiError`.
///
/// The streaming endpoint reports failures before the first frame as a
/// regular JSON error body, so the message is taken from `error.message`
/// when the body is structured and from the raw text otherwise.
pub fn map_http_status(status: u16, body: &[u8]) -> GeminiError {
    let (message, api_status) = match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (String::from_utf8_lossy(body).into_owned(), String::new()),
    };

    match status {
        400 => GeminiError::Request(RequestError::ValidationError { message }),
        401 => GeminiError::Authentication(AuthenticationError::InvalidApiKey),
        403 => GeminiError::Authentication(AuthenticationError::PermissionDenied { message }),
        404 => GeminiError::Resource(ResourceError::ModelNotFound {
            model: extract_model_name(&message),
        }),
        429 => GeminiError::RateLimit(RateLimitError::TooManyRequests { retry_after: None }),
        503 => GeminiError::Server(ServerError::ServiceUnavailable { message }),
        _ if api_status == "INVALID_ARGUMENT" => {
            GeminiError::Request(RequestError::ValidationError { message })
        }
        _ => GeminiError::Server(ServerError::InternalError {
            message: format!("HTTP {}: {}", status, message),
        }),
    }
}

/// Extracts a `models/...` identifier from an error message.
fn extract_model_name(message: &str) -> String {
    message
        .split_whitespace()
        .find(|s| s.starts_with("models/"))
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric() && c != '/' && c != '-' && c != '.' && c != '_'))
        .unwrap_or("unknown")
        .to_string()
}
