//! Validation of streamed generation requests.

use crate::error::{GeminiResult, RequestError};
use crate::types::{GenerateContentRequest, GenerationConfig, Content};

/// Validate a model name before it is placed in a URL path.
pub fn validate_model(model: &str) -> GeminiResult<()> {
    let name = model.trim_start_matches("models/");
    let valid = !name.is_empty()
        && !name.contains(char::is_whitespace)
        && !name.contains(['?', '#', ':']);

    if !valid {
        return Err(RequestError::InvalidModel {
            model: model.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Validate a generate content request.
///
/// All problems are collected into a single validation error.
pub fn validate_generate_request(request: &GenerateContentRequest) -> GeminiResult<()> {
    let mut problems = Vec::new();

    if request.contents.is_empty() {
        problems.push("contents: cannot be empty".to_string());
    }

    for (idx, content) in request.contents.iter().enumerate() {
        check_content(content, &format!("contents[{}]", idx), &mut problems);
    }

    if let Some(system_instruction) = &request.system_instruction {
        check_content(system_instruction, "system_instruction", &mut problems);
    }

    if let Some(config) = &request.generation_config {
        check_generation_config(config, &mut problems);
    }

    if !problems.is_empty() {
        return Err(RequestError::ValidationError {
            message: problems.join("; "),
        }
        .into());
    }

    Ok(())
}

fn check_content(content: &Content, prefix: &str, problems: &mut Vec<String>) {
    if content.parts.is_empty() {
        problems.push(format!("{}.parts: must have at least one part", prefix));
    }

    for (idx, part) in content.parts.iter().enumerate() {
        if part.is_empty() {
            problems.push(format!("{}.parts[{}]: carries no data", prefix, idx));
        }
        if let Some(call) = &part.function_call {
            if call.name.is_empty() {
                problems.push(format!("{}.parts[{}].function_call.name: is required", prefix, idx));
            }
        }
        if let Some(response) = &part.function_response {
            if response.name.is_empty() {
                problems.push(format!("{}.parts[{}].function_response.name: is required", prefix, idx));
            }
        }
    }
}

fn check_generation_config(config: &GenerationConfig, problems: &mut Vec<String>) {
    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            problems.push("generation_config.temperature: must be between 0.0 and 2.0".to_string());
        }
    }

    if let Some(top_p) = config.top_p {
        if !(0.0..=1.0).contains(&top_p) {
            problems.push("generation_config.top_p: must be between 0.0 and 1.0".to_string());
        }
    }

    if let Some(top_k) = config.top_k {
        if top_k < 1 {
            problems.push("generation_config.top_k: must be at least 1".to_string());
        }
    }

    if let Some(max_output_tokens) = config.max_output_tokens {
        if max_output_tokens < 1 {
            problems.push("generation_config.max_output_tokens: must be at least 1".to_string());
        }
    }

    if let Some(candidate_count) = config.candidate_count {
        if candidate_count < 1 {
            problems.push("generation_config.candidate_count: must be at least 1".to_string());
        }
    }
}
