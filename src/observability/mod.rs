//! Observability layer for the Gemini streaming client.
//!
//! Structured logging through a `Logger` trait. The streaming core itself
//! emits plain `tracing` events; the logger carries the request-level events
//! of the content service.
//!
//! # Example
//!
//! ```rust
//! use integrations_gemini_stream::observability::{Logger, StructuredLogger};
//! use integrations_gemini_stream::config::LogLevel;
//! use serde_json::json;
//!
//! let logger = StructuredLogger::new("gemini.content")
//!     .with_level(LogLevel::Debug);
//!
//! logger.info("Stream opened", json!({
//!     "model": "gemini-pro",
//! }));
//! ```

pub mod logging;

pub use logging::{Logger, NoopLogger, StructuredLogger};

use crate::config::GeminiConfig;

/// Create the logger described by the configuration.
///
/// Returns a [`NoopLogger`] when logging is disabled.
pub fn create_logger(service_name: &str, config: &GeminiConfig) -> Box<dyn Logger> {
    if config.enable_logging {
        Box::new(StructuredLogger::new(service_name).with_level(config.log_level))
    } else {
        Box::new(NoopLogger)
    }
}
