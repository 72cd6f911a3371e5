//! Content service implementation for streamed generation.

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::json;

use super::ContentService;
use super::validation::{validate_generate_request, validate_model};
use crate::auth::{ApiKeyAuthManager, AuthManager};
use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::observability::{create_logger, Logger};
use crate::streaming::{process_stream, GenerateContentStreamResult};
use crate::transport::{HttpTransport, RequestBuilder, ReqwestTransport, TransportError};
use crate::types::{GenerateContentRequest, GenerationConfig, SafetySetting};

/// Implementation of the ContentService.
pub struct ContentServiceImpl {
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    default_generation_config: Option<GenerationConfig>,
    default_safety_settings: Vec<SafetySetting>,
    logger: Box<dyn Logger>,
}

impl ContentServiceImpl {
    /// Create a new content service implementation.
    pub fn new(
        config: &GeminiConfig,
        transport: Arc<dyn HttpTransport>,
        auth_manager: Box<dyn AuthManager>,
        logger: Box<dyn Logger>,
    ) -> Self {
        let request_builder = RequestBuilder::new(
            config.base_url.clone(),
            config.api_version.clone(),
            auth_manager,
        );

        Self {
            transport,
            request_builder,
            default_generation_config: None,
            default_safety_settings: Vec::new(),
            logger,
        }
    }

    /// Create a service talking to the real API over reqwest.
    pub fn from_config(config: &GeminiConfig) -> GeminiResult<Self> {
        let transport = ReqwestTransport::new(config.timeout, config.connect_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a service over the given transport, with API key auth and the
    /// configured logger.
    pub fn with_transport(config: &GeminiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            config,
            transport,
            Box::new(ApiKeyAuthManager::from_config(config)),
            create_logger("gemini.content", config),
        )
    }

    /// Set the default generation config for this service.
    pub fn with_default_generation_config(mut self, config: GenerationConfig) -> Self {
        self.default_generation_config = Some(config);
        self
    }

    /// Set the default safety settings for this service.
    pub fn with_default_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.default_safety_settings = settings;
        self
    }

    /// Merge request with default settings. Request values win.
    fn merge_with_defaults(&self, mut request: GenerateContentRequest) -> GenerateContentRequest {
        request.generation_config = match (request.generation_config, &self.default_generation_config) {
            (Some(req), Some(def)) => Some(GenerationConfig {
                temperature: req.temperature.or(def.temperature),
                top_p: req.top_p.or(def.top_p),
                top_k: req.top_k.or(def.top_k),
                max_output_tokens: req.max_output_tokens.or(def.max_output_tokens),
                stop_sequences: req.stop_sequences.or_else(|| def.stop_sequences.clone()),
                candidate_count: req.candidate_count.or(def.candidate_count),
                response_mime_type: req.response_mime_type.or_else(|| def.response_mime_type.clone()),
                response_schema: req.response_schema.or_else(|| def.response_schema.clone()),
            }),
            (req, def) => req.or_else(|| def.clone()),
        };

        request.safety_settings = match request.safety_settings {
            Some(settings) if !settings.is_empty() => Some(settings),
            _ if !self.default_safety_settings.is_empty() => Some(self.default_safety_settings.clone()),
            _ => None,
        };

        request
    }
}

#[async_trait]
impl ContentService for ContentServiceImpl {
    async fn generate_content_stream(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentStreamResult> {
        self.logger.debug("Starting streaming content generation", json!({
            "model": model,
            "contents_count": request.contents.len(),
            "has_generation_config": request.generation_config.is_some(),
            "has_tools": request.tools.is_some(),
        }));

        validate_model(model)?;
        validate_generate_request(&request)?;

        let merged_request = self.merge_with_defaults(request);
        let http_request = self.request_builder.build_streaming_request(model, &merged_request)?;

        let body = self.transport
            .send_streaming(http_request)
            .await
            .map_err(|e: TransportError| {
                let error = GeminiError::from(e);
                self.logger.error("Streaming request failed", json!({
                    "error": error.to_string(),
                    "model": model,
                }));
                error
            })?;

        self.logger.info("Streaming content generation started", json!({
            "model": model,
        }));

        Ok(process_stream(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::NoopLogger;
    use crate::transport::{ChunkedStream, HttpRequest};
    use secrecy::SecretString;

    struct UnreachableTransport;

    #[async_trait]
    impl HttpTransport for UnreachableTransport {
        async fn send_streaming(&self, _request: HttpRequest) -> Result<ChunkedStream, TransportError> {
            Err(TransportError::Connection("unreachable".to_string()))
        }
    }

    fn service() -> ContentServiceImpl {
        let config = GeminiConfig::builder()
            .api_key(SecretString::new("test-key".into()))
            .build()
            .unwrap();

        ContentServiceImpl::new(
            &config,
            Arc::new(UnreachableTransport),
            Box::new(ApiKeyAuthManager::from_config(&config)),
            Box::new(NoopLogger),
        )
    }

    #[test]
    fn test_merge_with_defaults_request_wins() {
        let service = service().with_default_generation_config(GenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(256),
            ..GenerationConfig::default()
        });

        let mut request = GenerateContentRequest::from_text("hi");
        request.generation_config = Some(GenerationConfig {
            temperature: Some(0.9),
            ..GenerationConfig::default()
        });

        let merged = service.merge_with_defaults(request).generation_config.unwrap();
        assert_eq!(merged.temperature, Some(0.9));
        assert_eq!(merged.max_output_tokens, Some(256));
    }

    #[test]
    fn test_merge_without_defaults_is_identity() {
        let service = service();
        let merged = service.merge_with_defaults(GenerateContentRequest::from_text("hi"));
        assert!(merged.generation_config.is_none());
        assert!(merged.safety_settings.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_mapped() {
        let result = service()
            .generate_content_stream("gemini-pro", GenerateContentRequest::from_text("hi"))
            .await;

        assert!(matches!(result, Err(GeminiError::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_transport() {
        let result = service()
            .generate_content_stream("gemini-pro", GenerateContentRequest::default())
            .await;

        assert!(matches!(result, Err(GeminiError::Request(_))));
    }
}
