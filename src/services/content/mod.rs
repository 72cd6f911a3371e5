//! Streamed content generation with Gemini models.

mod service;
mod validation;

use async_trait::async_trait;
use crate::error::GeminiResult;
use crate::streaming::GenerateContentStreamResult;
use crate::types::GenerateContentRequest;

pub use service::ContentServiceImpl;
pub use validation::{validate_generate_request, validate_model};

/// Service for streamed content generation.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Start a streamed `generateContent` call.
    ///
    /// Resolves once the server has accepted the request. The returned value
    /// carries the live fragment stream and the deferred aggregate; both are
    /// driven by a background task on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, on transport failure before the body starts,
    /// or when the server answers with a non-success status.
    async fn generate_content_stream(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentStreamResult>;
}
