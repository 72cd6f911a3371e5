//! Structured logging implementation for the Gemini streaming client.
//!
//! Provides trait-based logging with structured field support.

use serde_json::Value;
use crate::config::LogLevel;

/// Field names whose values never reach a log line.
const SENSITIVE_KEYS: [&str; 11] = [
    "api_key", "apiKey", "key",
    "token", "access_token", "accessToken",
    "secret", "password", "credential",
    "authorization", "x-goog-api-key",
];

/// Logger trait for structured logging.
///
/// This trait provides methods for logging messages with structured context data.
/// Implementations can integrate with various logging backends (e.g., tracing, log, custom).
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning message with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

/// Structured logger implementation using the tracing crate.
///
/// Emits one tracing event per call, with the logger name and the
/// JSON-formatted context as fields. Sensitive keys are redacted first.
pub struct StructuredLogger {
    name: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Create a new structured logger with the given name.
    ///
    /// # Example
    /// ```
    /// use integrations_gemini_stream::observability::StructuredLogger;
    ///
    /// let logger = StructuredLogger::new("gemini.content");
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level for this logger.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

/// Redact sensitive fields from log data, recursing into nested objects.
fn redact_sensitive_fields(mut fields: Value) -> Value {
    if let Some(obj) = fields.as_object_mut() {
        for (key, value) in obj.iter_mut() {
            if SENSITIVE_KEYS.contains(&key.as_str()) {
                *value = Value::String("***REDACTED***".to_string());
            } else if value.is_object() {
                *value = redact_sensitive_fields(value.take());
            }
        }
    }

    fields
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Debug) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::debug!(logger = %self.name, fields = %redacted_fields, "{}", message);
    }

    fn info(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::info!(logger = %self.name, fields = %redacted_fields, "{}", message);
    }

    fn warn(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::warn!(logger = %self.name, fields = %redacted_fields, "{}", message);
    }

    fn error(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::error!(logger = %self.name, fields = %redacted_fields, "{}", message);
    }
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str, _fields: Value) {}

    fn info(&self, _message: &str, _fields: Value) {}

    fn warn(&self, _message: &str, _fields: Value) {}

    fn error(&self, _message: &str, _fields: Value) {}
}
