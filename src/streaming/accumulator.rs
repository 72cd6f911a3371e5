//! Stream accumulator for combining streaming response fragments.
//!
//! Folds the ordered fragments of one `streamGenerateContent` call into the
//! single response a non-streamed call would have returned.

use std::collections::BTreeMap;

use futures::stream::{Stream, StreamExt};

use crate::error::GeminiResult;
use crate::types::{
    Candidate, Content, GenerateContentResponse, Part, PromptFeedback, Role, UsageMetadata,
};

/// Accumulator for combining streaming response fragments.
///
/// Candidates are keyed by their `index`. Each index owns exactly one
/// accumulated candidate that later fragments update in place:
/// - Citation, grounding, finish reason, finish message, safety ratings and
///   token count take the latest value a fragment supplied.
/// - Content parts merge by position. The part at position *n* of a fragment
///   assigns its text, function call, executable code or code execution
///   result to slot *n*; text is replaced, not appended.
/// - Usage metadata, prompt feedback and model version take the latest value.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    /// Accumulated candidates, ordered by index.
    candidates: BTreeMap<u32, Candidate>,
    /// Latest usage metadata seen.
    usage_metadata: Option<UsageMetadata>,
    /// Latest prompt feedback seen.
    prompt_feedback: Option<PromptFeedback>,
    /// Model version
    model_version: Option<String>,
    /// Fragments folded so far.
    chunks: usize,
}

impl StreamAccumulator {
    /// Create a new stream accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment into the accumulated state.
    pub fn add_chunk(&mut self, chunk: GenerateContentResponse) {
        self.chunks += 1;

        if chunk.usage_metadata.is_some() {
            self.usage_metadata = chunk.usage_metadata;
        }
        if chunk.prompt_feedback.is_some() {
            self.prompt_feedback = chunk.prompt_feedback;
        }
        if chunk.model_version.is_some() {
            self.model_version = chunk.model_version;
        }

        for candidate in chunk.candidates.into_iter().flatten() {
            // The wire format omits fields holding their default, so no index means 0.
            let index = candidate.index.unwrap_or(0);
            let existing = self.candidates.entry(index).or_insert_with(|| Candidate {
                index: Some(index),
                ..Candidate::default()
            });
            merge_candidate(existing, candidate);
        }
    }

    /// Number of fragments folded so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Accumulated candidates in index order.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    /// Get a reference to the usage metadata.
    pub fn usage_metadata(&self) -> Option<&UsageMetadata> {
        self.usage_metadata.as_ref()
    }

    /// Finalize and return the accumulated response.
    pub fn finalize(self) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: if self.candidates.is_empty() {
                None
            } else {
                Some(self.candidates.into_values().collect())
            },
            prompt_feedback: self.prompt_feedback,
            usage_metadata: self.usage_metadata,
            model_version: self.model_version,
        }
    }
}

fn merge_candidate(existing: &mut Candidate, new: Candidate) {
    if new.citation_metadata.is_some() {
        existing.citation_metadata = new.citation_metadata;
    }
    if new.grounding_metadata.is_some() {
        existing.grounding_metadata = new.grounding_metadata;
    }
    if new.finish_reason.is_some() {
        existing.finish_reason = new.finish_reason;
    }
    if new.finish_message.is_some() {
        existing.finish_message = new.finish_message;
    }
    if new.safety_ratings.is_some() {
        existing.safety_ratings = new.safety_ratings;
    }
    if new.token_count.is_some() {
        existing.token_count = new.token_count;
    }

    let Some(content) = new.content.filter(|c| !c.parts.is_empty()) else {
        return;
    };

    let merged = existing.content.get_or_insert_with(|| Content {
        role: Some(content.role.unwrap_or(Role::User)),
        parts: Vec::new(),
    });

    for (slot, part) in content.parts.into_iter().enumerate() {
        if slot == merged.parts.len() {
            merged.parts.push(Part::default());
        }
        merge_part(&mut merged.parts[slot], part);
    }
}

fn merge_part(slot: &mut Part, part: Part) {
    let mut supplied = false;

    if let Some(text) = part.text {
        slot.text = Some(text);
        supplied = true;
    }
    if let Some(function_call) = part.function_call {
        slot.function_call = Some(function_call);
        supplied = true;
    }
    if let Some(executable_code) = part.executable_code {
        slot.executable_code = Some(executable_code);
        supplied = true;
    }
    if let Some(result) = part.code_execution_result {
        slot.code_execution_result = Some(result);
        supplied = true;
    }

    if !supplied && slot.is_empty() {
        slot.text = Some(String::new());
    }
}

/// Fold an already-collected list of fragments.
pub fn aggregate_responses(responses: &[GenerateContentResponse]) -> GenerateContentResponse {
    let mut accumulator = StreamAccumulator::new();
    for response in responses {
        accumulator.add_chunk(response.clone());
    }
    accumulator.finalize()
}

/// Drain a fragment stream and fold it.
///
/// The first error ends the fold and is returned as is; no partial result is
/// produced.
pub async fn aggregate_stream<S>(stream: S) -> GeminiResult<GenerateContentResponse>
where
    S: Stream<Item = GeminiResult<GenerateContentResponse>>,
{
    futures::pin_mut!(stream);
    let mut accumulator = StreamAccumulator::new();

    while let Some(chunk) = stream.next().await {
        accumulator.add_chunk(chunk?);
    }

    tracing::debug!(
        chunks = accumulator.chunk_count(),
        candidates = accumulator.candidates.len(),
        "Aggregated streamed response"
    );
    Ok(accumulator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinishReason, HarmCategory, HarmProbability, SafetyRating};
    use pretty_assertions::assert_eq;

    fn text_candidate(index: Option<u32>, text: &str) -> Candidate {
        Candidate {
            index,
            content: Some(Content {
                role: Some(Role::Model),
                parts: vec![Part::text(text)],
            }),
            ..Candidate::default()
        }
    }

    fn response(candidates: Vec<Candidate>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(candidates),
            ..GenerateContentResponse::default()
        }
    }

    #[test]
    fn test_accumulator_empty() {
        let accumulator = StreamAccumulator::new();
        let result = accumulator.finalize();
        assert!(result.candidates.is_none());
        assert!(result.usage_metadata.is_none());
    }

    #[test]
    fn test_text_slot_is_assigned_not_appended() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![text_candidate(Some(0), "Hello")]));
        accumulator.add_chunk(response(vec![text_candidate(Some(0), " World")]));

        let result = accumulator.finalize();
        let candidates = result.candidates.unwrap();
        assert_eq!(candidates.len(), 1);
        let parts = &candidates[0].content.as_ref().unwrap().parts;
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text.as_deref(), Some(" World"));
    }

    #[test]
    fn test_scalar_fields_last_write_wins() {
        let rating = SafetyRating {
            category: HarmCategory::Harassment,
            probability: HarmProbability::Negligible,
            blocked: false,
        };
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![Candidate {
            finish_reason: Some(FinishReason::MaxTokens),
            finish_message: Some("first".to_string()),
            ..text_candidate(Some(0), "a")
        }]));
        accumulator.add_chunk(response(vec![Candidate {
            index: Some(0),
            finish_reason: Some(FinishReason::Stop),
            safety_ratings: Some(vec![rating.clone()]),
            ..Candidate::default()
        }]));

        let candidate = accumulator.finalize().candidates.unwrap().remove(0);
        assert_eq!(candidate.finish_reason, Some(FinishReason::Stop));
        // Absent in the later fragment, so the earlier value stays.
        assert_eq!(candidate.finish_message.as_deref(), Some("first"));
        assert_eq!(candidate.safety_ratings, Some(vec![rating]));
        assert_eq!(candidate.content.unwrap().parts[0].text.as_deref(), Some("a"));
    }

    #[test]
    fn test_candidates_ordered_by_index() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![text_candidate(Some(2), "two")]));
        accumulator.add_chunk(response(vec![text_candidate(Some(0), "zero")]));
        accumulator.add_chunk(response(vec![text_candidate(Some(2), "two again")]));

        let candidates = accumulator.finalize().candidates.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].index, Some(0));
        assert_eq!(candidates[1].index, Some(2));
        assert_eq!(
            candidates[1].content.as_ref().unwrap().parts[0].text.as_deref(),
            Some("two again")
        );
    }

    #[test]
    fn test_missing_index_means_zero() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![text_candidate(None, "first")]));
        accumulator.add_chunk(response(vec![text_candidate(Some(0), "second")]));

        let candidates = accumulator.finalize().candidates.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, Some(0));
        assert_eq!(
            candidates[0].content.as_ref().unwrap().parts[0].text.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_unindexed_candidate_does_not_merge_into_explicit_index() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![
            text_candidate(Some(1), "one"),
            text_candidate(None, "unindexed"),
        ]));

        let candidates = accumulator.finalize().candidates.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].index, Some(0));
        assert_eq!(
            candidates[0].content.as_ref().unwrap().parts[0].text.as_deref(),
            Some("unindexed")
        );
        assert_eq!(candidates[1].index, Some(1));
        assert_eq!(
            candidates[1].content.as_ref().unwrap().parts[0].text.as_deref(),
            Some("one")
        );
    }

    #[test]
    fn test_parts_merge_positionally() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![Candidate {
            index: Some(0),
            content: Some(Content {
                role: None,
                parts: vec![Part::text("intro")],
            }),
            ..Candidate::default()
        }]));
        accumulator.add_chunk(response(vec![Candidate {
            index: Some(0),
            content: Some(Content {
                role: Some(Role::Model),
                parts: vec![
                    Part::executable_code("PYTHON", "print(1)"),
                    Part::code_execution_result("OUTCOME_OK", Some("1\n".to_string())),
                ],
            }),
            ..Candidate::default()
        }]));

        let content = accumulator.finalize().candidates.unwrap().remove(0).content.unwrap();
        // Role comes from the fragment that created the content.
        assert_eq!(content.role, Some(Role::User));
        assert_eq!(content.parts.len(), 2);
        assert_eq!(content.parts[0].text.as_deref(), Some("intro"));
        assert_eq!(content.parts[0].executable_code.as_ref().unwrap().code, "print(1)");
        assert_eq!(
            content.parts[1].code_execution_result.as_ref().unwrap().output.as_deref(),
            Some("1\n")
        );
    }

    #[test]
    fn test_part_without_known_payload_defaults_to_empty_text() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![Candidate {
            index: Some(0),
            content: Some(Content {
                role: Some(Role::Model),
                parts: vec![Part::inline_data("image/png", "AAAA")],
            }),
            ..Candidate::default()
        }]));

        let part = accumulator.finalize().candidates.unwrap().remove(0).content.unwrap().parts.remove(0);
        assert_eq!(part, Part::text(""));
    }

    #[test]
    fn test_content_without_parts_is_ignored() {
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(response(vec![Candidate {
            index: Some(0),
            content: Some(Content::default()),
            ..Candidate::default()
        }]));
        let candidate = accumulator.finalize().candidates.unwrap().remove(0);
        assert!(candidate.content.is_none());
    }

    #[test]
    fn test_top_level_metadata_last_write_wins() {
        let usage = |total| UsageMetadata {
            prompt_token_count: 5,
            candidates_token_count: Some(total - 5),
            total_token_count: total,
            cached_content_token_count: None,
        };
        let mut accumulator = StreamAccumulator::new();
        accumulator.add_chunk(GenerateContentResponse {
            usage_metadata: Some(usage(10)),
            model_version: Some("gemini-1.5-flash-001".to_string()),
            ..response(vec![text_candidate(Some(0), "a")])
        });
        accumulator.add_chunk(GenerateContentResponse {
            usage_metadata: Some(usage(17)),
            prompt_feedback: Some(PromptFeedback::default()),
            ..response(vec![text_candidate(Some(0), "b")])
        });

        let result = accumulator.finalize();
        assert_eq!(result.usage_metadata, Some(usage(17)));
        assert_eq!(result.prompt_feedback, Some(PromptFeedback::default()));
        assert_eq!(result.model_version.as_deref(), Some("gemini-1.5-flash-001"));
    }

    #[test]
    fn test_aggregate_responses_matches_incremental_fold() {
        let fragments = vec![
            response(vec![text_candidate(Some(0), "x")]),
            response(vec![Candidate {
                index: Some(0),
                finish_reason: Some(FinishReason::Stop),
                ..Candidate::default()
            }]),
        ];
        let mut accumulator = StreamAccumulator::new();
        for fragment in fragments.clone() {
            accumulator.add_chunk(fragment);
        }
        assert_eq!(aggregate_responses(&fragments), accumulator.finalize());
    }
}
