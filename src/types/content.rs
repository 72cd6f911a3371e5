//! Content-related types for the Gemini API.
//!
//! This module contains types for representing content, messages, and their parts.

use serde::{Deserialize, Serialize};

/// A part of a content message.
///
/// On the wire each part carries exactly one kind of payload. Parts produced
/// by the stream aggregator may carry several, one merged part per position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    /// Reference to file data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    /// A function call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// A function response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Executable code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_code: Option<ExecutableCode>,
    /// Code execution result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_execution_result: Option<CodeExecutionResult>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a function call part.
    pub fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
            ..Self::default()
        }
    }

    /// Create an executable code part.
    pub fn executable_code(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            executable_code: Some(ExecutableCode {
                language: language.into(),
                code: code.into(),
            }),
            ..Self::default()
        }
    }

    /// Create a code execution result part.
    pub fn code_execution_result(outcome: impl Into<String>, output: Option<String>) -> Self {
        Self {
            code_execution_result: Some(CodeExecutionResult {
                outcome: outcome.into(),
                output,
            }),
            ..Self::default()
        }
    }

    /// Create an inline data part.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Self::default()
        }
    }

    /// True when none of the payload fields are set.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.inline_data.is_none()
            && self.file_data.is_none()
            && self.function_call.is_none()
            && self.function_response.is_none()
            && self.executable_code.is_none()
            && self.code_execution_result.is_none()
    }
}

/// Binary data blob with MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The MIME type of the data.
    pub mime_type: String,
    /// Base64-encoded binary data.
    pub data: String,
}

/// Reference to file data stored in Gemini's file service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// The MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// The URI of the file.
    pub file_uri: String,
}

/// A function call request from the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// The name of the function to call.
    pub name: String,
    /// The arguments to pass to the function.
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A function response to send back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// The name of the function that was called.
    pub name: String,
    /// The response data from the function.
    pub response: serde_json::Value,
}

/// Executable code generated by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutableCode {
    /// The programming language of the code.
    pub language: String,
    /// The code to execute.
    pub code: String,
}

/// The result of code execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeExecutionResult {
    /// The outcome of the execution.
    pub outcome: String,
    /// The output from the execution, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A content message with a role and parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the content author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content from a single text prompt.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::text(text)],
        }
    }
}

/// The role of a message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,
    /// Model role.
    Model,
    /// System role.
    System,
    /// Function role, used for function responses.
    Function,
    /// A role this client does not know yet.
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_wire_names() {
        let part: Part = serde_json::from_str(
            r#"{"functionCall":{"name":"lookup","args":{"q":"rust"}}}"#,
        )
        .unwrap();
        assert_eq!(part.function_call.as_ref().unwrap().name, "lookup");
        assert!(part.text.is_none());

        let json = serde_json::to_value(Part::code_execution_result("OUTCOME_OK", Some("42".into()))).unwrap();
        assert_eq!(json["codeExecutionResult"]["outcome"], "OUTCOME_OK");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_empty_part() {
        let part: Part = serde_json::from_str("{}").unwrap();
        assert!(part.is_empty());
        assert!(!Part::text("").is_empty());
    }

    #[test]
    fn test_content_without_parts() {
        let content: Content = serde_json::from_str(r#"{"role":"model"}"#).unwrap();
        assert_eq!(content.role, Some(Role::Model));
        assert!(content.parts.is_empty());
    }

    #[test]
    fn test_unknown_role_falls_back_to_other() {
        let content: Content =
            serde_json::from_str(r#"{"role":"tool","parts":[{"text":"hi"}]}"#).unwrap();
        assert_eq!(content.role, Some(Role::Other));
        assert_eq!(content.parts[0].text.as_deref(), Some("hi"));
    }
}
