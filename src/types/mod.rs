//! Core types for the Gemini API.
//!
//! This module contains the request sent to the streaming endpoint and the
//! response types every stream fragment deserializes into.

// Module declarations
pub mod content;
pub mod generation;
pub mod safety;
pub mod tools;

// Re-exports for content types
pub use content::{
    Blob, CodeExecutionResult, Content, ExecutableCode, FileData, FunctionCall, FunctionResponse,
    Part, Role,
};

// Re-exports for generation types
pub use generation::{
    BlockReason, Candidate, CitationMetadata, CitationSource, FinishReason,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, GroundingMetadata,
    PromptFeedback, UsageMetadata,
};

// Re-exports for safety types
pub use safety::{HarmBlockThreshold, HarmCategory, HarmProbability, SafetyRating, SafetySetting};

// Re-exports for tool types
pub use tools::{
    CodeExecution, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, Tool,
    ToolConfig,
};
