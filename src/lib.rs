//! # Gemini Streaming Response Processor
//!
//! Turns the body of a streamed Google Gemini `generateContent` call into two
//! views of the same answer:
//!
//! - a live stream of response fragments, yielded as soon as each one is decoded
//! - a deferred aggregate, equal in shape to the non-streamed response
//!
//! ## Features
//!
//! - Server-sent-event frame decoding that tolerates arbitrary chunk boundaries
//! - Independent consumption of the live stream and the aggregate
//! - Deterministic per-candidate merging of fragments
//! - `text()` / `function_calls()` helpers on every response
//! - Thin request layer with API key auth over `reqwest`
//! - Secure credential handling with `SecretString`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_gemini_stream::{
//!     ContentService, ContentServiceImpl, GeminiConfig, GenerateContentRequest,
//! };
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeminiConfig::from_env()?;
//!     let service = ContentServiceImpl::from_config(&config)?;
//!
//!     let mut result = service
//!         .generate_content_stream("gemini-pro", GenerateContentRequest::from_text("Tell me a story"))
//!         .await?;
//!
//!     while let Some(fragment) = result.stream.next().await {
//!         print!("{}", fragment?.text()?);
//!     }
//!
//!     let response = result.response.await?;
//!     println!("\n{:?}", response.usage_metadata());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `streaming` - Frame decoder, fork, accumulator and response helpers
//! - `services` - The streamed content service
//! - `transport` - HTTP transport abstraction and the reqwest implementation
//! - `config` - Configuration types and builder
//! - `auth` - API key management
//! - `error` - Error types and HTTP status mapping
//! - `observability` - Structured logging
//! - `types` - Request and response models
//! - `mocks` - Scripted transport for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod services;
pub mod streaming;
pub mod transport;
pub mod types;

// Testing support - always available for integration tests
pub mod mocks;

// Re-exports for convenience
pub use auth::{ApiKeyAuthManager, AuthManager};
pub use config::{
    AuthMethod, GeminiConfig, GeminiConfigBuilder, LogLevel, DEFAULT_API_VERSION,
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use error::{
    // Main error types
    GeminiError,
    GeminiResult,
    // Error categories
    AuthenticationError,
    ConfigurationError,
    ContentError,
    NetworkError,
    RateLimitError,
    RequestError,
    ResourceError,
    ResponseError,
    ServerError,
    // Error mapping utilities
    map_http_status,
};
pub use transport::{
    ChunkedStream, HttpMethod, HttpRequest, HttpTransport, ReqwestTransport, RequestBuilder,
    TransportError,
};

// Type re-exports
pub use types::{
    // Content types
    Blob, Content, Part, Role,
    FileData, FunctionCall, FunctionResponse,
    ExecutableCode, CodeExecutionResult,
    // Safety types
    HarmBlockThreshold, HarmCategory, HarmProbability, SafetyRating, SafetySetting,
    // Generation types
    GenerationConfig, FinishReason, UsageMetadata, BlockReason, PromptFeedback,
    Candidate, CitationMetadata, CitationSource, GroundingMetadata,
    // Tool types
    Tool, ToolConfig, FunctionDeclaration, FunctionCallingConfig, FunctionCallingMode,
    CodeExecution,
    // Request/Response types
    GenerateContentRequest, GenerateContentResponse,
};

// Service re-exports
pub use services::{ContentService, ContentServiceImpl};

// Streaming re-exports
pub use streaming::{
    aggregate_responses, aggregate_stream, fork, process_byte_stream, process_stream,
    AggregatedResponse, Branch, EnhancedGenerateContentResponse, EnhancedResponseStream,
    GenerateContentStreamResult, ResponseDecoder, SseFrameDecoder, StreamAccumulator,
};

// Observability re-exports
pub use observability::{create_logger, Logger, NoopLogger, StructuredLogger};
