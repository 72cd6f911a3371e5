//! HTTP request builder for the streaming endpoint.
//!
//! This module provides the `RequestBuilder` for constructing the single
//! request this crate issues: `POST models/{model}:streamGenerateContent?alt=sse`.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use crate::auth::AuthManager;
use crate::error::GeminiError;
use super::http::{HttpRequest, HttpMethod};

/// Path segment that prefixes model names.
const MODELS_PREFIX: &str = "models/";

/// Builds the endpoint path for streamed generation.
///
/// Accepts both bare (`gemini-pro`) and qualified (`models/gemini-pro`)
/// model names; tuned models (`tunedModels/...`) are left as they are.
///
/// ```
/// use integrations_gemini_stream::transport::stream_generate_content_path;
///
/// assert_eq!(
///     stream_generate_content_path("gemini-pro"),
///     "models/gemini-pro:streamGenerateContent"
/// );
/// ```
pub fn stream_generate_content_path(model: &str) -> String {
    let model = model.trim_start_matches('/');
    if model.contains('/') {
        format!("{}:streamGenerateContent", model)
    } else {
        format!("{}{}:streamGenerateContent", MODELS_PREFIX, model)
    }
}

/// Builder for constructing HTTP requests to the Gemini API.
///
/// The `RequestBuilder` handles:
/// - URL construction with API version prefixes
/// - Authentication via the configured auth manager
/// - Header management (Content-Type, Accept)
/// - Request body serialization
pub struct RequestBuilder {
    /// Base URL for the API.
    base_url: Url,
    /// API version (e.g., "v1beta").
    api_version: String,
    /// Authentication manager.
    auth_manager: Box<dyn AuthManager>,
}

impl RequestBuilder {
    /// Creates a new request builder.
    pub fn new(
        base_url: Url,
        api_version: String,
        auth_manager: Box<dyn AuthManager>,
    ) -> Self {
        Self {
            base_url,
            api_version,
            auth_manager,
        }
    }

    /// Builds a complete URL for the given path.
    ///
    /// Prepends the API version, appends `query` and, for query-parameter
    /// authentication, the API key.
    pub fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GeminiError> {
        let path = path.trim_start_matches('/');
        let full_path = format!("{}/{}", self.api_version, path);

        let mut url = self.base_url.join(&full_path)?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if let Some((key, value)) = self.auth_manager.get_auth_query_param() {
                pairs.append_pair(&key, &value);
            }
        }

        // `query_pairs_mut` leaves an empty `?` behind when nothing was added.
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// Builds the server-sent-events request for streamed generation.
    pub fn build_streaming_request<T: Serialize>(
        &self,
        model: &str,
        body: &T,
    ) -> Result<HttpRequest, GeminiError> {
        let url = self.build_url(&stream_generate_content_path(model), &[("alt", "sse")])?;

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("accept".to_string(), "text/event-stream".to_string());

        if let Some((key, value)) = self.auth_manager.get_auth_header() {
            headers.insert(key, value);
        }

        let body = Bytes::from(serde_json::to_vec(body)?);

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers,
            body: Some(body),
        })
    }
}
