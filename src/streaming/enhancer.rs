//! Convenience accessors over a generated response.

use std::ops::Deref;

use serde::Serialize;

use crate::error::{ContentError, GeminiError, GeminiResult};
use crate::types::{Candidate, FunctionCall, GenerateContentResponse, PromptFeedback, UsageMetadata};

/// A response with read-only helpers for the common cases.
///
/// Wraps both live stream fragments and the aggregated response. The wrapped
/// value is never modified; it can be reached through `Deref` or taken back
/// with [`EnhancedGenerateContentResponse::into_inner`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnhancedGenerateContentResponse {
    inner: GenerateContentResponse,
}

impl EnhancedGenerateContentResponse {
    /// Wrap a response.
    pub fn new(inner: GenerateContentResponse) -> Self {
        Self { inner }
    }

    /// Give back the wrapped response.
    pub fn into_inner(self) -> GenerateContentResponse {
        self.inner
    }

    /// The first candidate, if any.
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.inner.candidates.as_ref().and_then(|c| c.first())
    }

    /// Token accounting, when the server reported it.
    pub fn usage_metadata(&self) -> Option<&UsageMetadata> {
        self.inner.usage_metadata.as_ref()
    }

    /// Text of the first candidate.
    ///
    /// Executable code is rendered as a fenced block tagged with its language
    /// and code execution output as an untagged fenced block, in part order.
    ///
    /// # Errors
    ///
    /// Fails when the first candidate stopped for safety, recitation or
    /// language reasons, or when there are no candidates because the prompt
    /// was blocked. Returns an empty string when there is simply nothing.
    pub fn text(&self) -> GeminiResult<String> {
        match self.usable_candidate()? {
            Some(candidate) => Ok(candidate_text(candidate)),
            None => Ok(String::new()),
        }
    }

    /// Function calls requested by the first candidate, `None` if there are none.
    ///
    /// # Errors
    ///
    /// Same conditions as [`EnhancedGenerateContentResponse::text`].
    pub fn function_calls(&self) -> GeminiResult<Option<Vec<FunctionCall>>> {
        let Some(candidate) = self.usable_candidate()? else {
            return Ok(None);
        };

        let calls: Vec<FunctionCall> = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.function_call.clone())
            .collect();

        Ok(if calls.is_empty() { None } else { Some(calls) })
    }

    fn usable_candidate(&self) -> GeminiResult<Option<&Candidate>> {
        if let Some(candidates) = self.inner.candidates.as_deref().filter(|c| !c.is_empty()) {
            if candidates.len() > 1 {
                tracing::warn!(
                    candidates = candidates.len(),
                    "Response has multiple candidates, using the first one only"
                );
            }

            let first = &candidates[0];
            if let Some(reason) = first.finish_reason.filter(|r| r.is_blocking()) {
                return Err(GeminiError::Content(ContentError::BadFinishReason {
                    reason: reason.as_str().to_string(),
                    message: first.finish_message.clone(),
                }));
            }
            return Ok(Some(first));
        }

        if let Some(feedback) = &self.inner.prompt_feedback {
            return Err(GeminiError::Content(ContentError::PromptBlocked {
                reason: block_description(feedback),
            }));
        }

        Ok(None)
    }
}

fn candidate_text(candidate: &Candidate) -> String {
    let mut text = String::new();
    let Some(content) = &candidate.content else {
        return text;
    };

    for part in &content.parts {
        if let Some(t) = &part.text {
            text.push_str(t);
        }
        if let Some(code) = &part.executable_code {
            text.push_str(&format!("\n```{}\n{}\n```\n", code.language, code.code));
        }
        if let Some(result) = &part.code_execution_result {
            text.push_str(&format!(
                "\n```\n{}\n```\n",
                result.output.as_deref().unwrap_or_default()
            ));
        }
    }
    text
}

fn block_description(feedback: &PromptFeedback) -> String {
    let reason = feedback
        .block_reason
        .map_or("an unspecified reason", |r| r.as_str());
    match &feedback.block_reason_message {
        Some(message) => format!("{}: {}", reason, message),
        None => reason.to_string(),
    }
}

impl Deref for EnhancedGenerateContentResponse {
    type Target = GenerateContentResponse;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<GenerateContentResponse> for EnhancedGenerateContentResponse {
    fn from(inner: GenerateContentResponse) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockReason, Content, FinishReason, Part, Role};
    use serde_json::json;

    fn with_parts(parts: Vec<Part>) -> EnhancedGenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![Candidate {
                index: Some(0),
                content: Some(Content {
                    role: Some(Role::Model),
                    parts,
                }),
                ..Candidate::default()
            }]),
            ..GenerateContentResponse::default()
        }
        .into()
    }

    #[test]
    fn test_text_joins_parts() {
        let response = with_parts(vec![Part::text("Hello, "), Part::text("world")]);
        assert_eq!(response.text().unwrap(), "Hello, world");
    }

    #[test]
    fn test_text_renders_code_blocks() {
        let response = with_parts(vec![
            Part::text("Running:"),
            Part::executable_code("PYTHON", "print(2 + 2)"),
            Part::code_execution_result("OUTCOME_OK", Some("4".to_string())),
        ]);
        assert_eq!(
            response.text().unwrap(),
            "Running:\n```PYTHON\nprint(2 + 2)\n```\n\n```\n4\n```\n"
        );
    }

    #[test]
    fn test_text_empty_response() {
        let response = EnhancedGenerateContentResponse::new(GenerateContentResponse::default());
        assert_eq!(response.text().unwrap(), "");
        assert_eq!(response.function_calls().unwrap(), None);
    }

    #[test]
    fn test_text_bad_finish_reason() {
        let mut inner = with_parts(vec![Part::text("partial")]).into_inner();
        if let Some(candidates) = inner.candidates.as_mut() {
            candidates[0].finish_reason = Some(FinishReason::Safety);
        }
        let response = EnhancedGenerateContentResponse::from(inner);
        assert!(matches!(
            response.text(),
            Err(GeminiError::Content(ContentError::BadFinishReason { ref reason, .. })) if reason == "SAFETY"
        ));
    }

    #[test]
    fn test_text_prompt_blocked() {
        let response = EnhancedGenerateContentResponse::new(GenerateContentResponse {
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some(BlockReason::Safety),
                ..PromptFeedback::default()
            }),
            ..GenerateContentResponse::default()
        });
        let err = response.text().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content error: Response was blocked due to SAFETY"
        );
    }

    #[test]
    fn test_function_calls() {
        let response = with_parts(vec![
            Part::text("calling"),
            Part::function_call("get_weather", json!({"city": "Paris"})),
        ]);
        let calls = response.function_calls().unwrap().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].args["city"], "Paris");
    }

    #[test]
    fn test_deref_and_serialize_are_transparent() {
        let response = with_parts(vec![Part::text("hi")]);
        assert_eq!(response.candidates.as_ref().map(Vec::len), Some(1));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["candidates"][0]["content"]["parts"][0]["text"], "hi");
    }
}
