//! Wiring of decoder, fork and accumulator for one streamed call.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use super::accumulator::aggregate_stream;
use super::decoder::ResponseDecoder;
use super::enhancer::EnhancedGenerateContentResponse;
use super::fork::fork;
use crate::error::{GeminiError, GeminiResult};
use crate::transport::ChunkedStream;

/// Live sequence of response fragments.
pub type EnhancedResponseStream =
    Pin<Box<dyn Stream<Item = GeminiResult<EnhancedGenerateContentResponse>> + Send>>;

/// Deferred aggregate of a streamed call.
pub type AggregatedResponse =
    Pin<Box<dyn Future<Output = GeminiResult<EnhancedGenerateContentResponse>> + Send>>;

/// The two views of one streamed `generateContent` call.
///
/// `stream` yields each fragment as it is decoded. `response` resolves to the
/// merged response once the body has been fully read. Both are fed from the
/// same decoded fragments and may be consumed in any order, interleaved, or
/// not at all; dropping one never stalls the other.
pub struct GenerateContentStreamResult {
    /// Fragments in wire order.
    pub stream: EnhancedResponseStream,
    /// The aggregated response.
    pub response: AggregatedResponse,
}

impl std::fmt::Debug for GenerateContentStreamResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateContentStreamResult").finish_non_exhaustive()
    }
}

/// Process a raw response body from the transport layer.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn process_stream(body: ChunkedStream) -> GenerateContentStreamResult {
    process_byte_stream(body.map(|chunk| chunk.map_err(GeminiError::from)))
}

/// Process a byte stream whose errors are already [`GeminiError`]s.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn process_byte_stream<S>(body: S) -> GenerateContentStreamResult
where
    S: Stream<Item = GeminiResult<Bytes>> + Send + 'static,
{
    let decoder = ResponseDecoder::new(Box::pin(body));
    let (aggregate_branch, live_branch) = fork(decoder);

    let stream = live_branch.map(|fragment| fragment.map(EnhancedGenerateContentResponse::from));
    let response = async move {
        aggregate_stream(aggregate_branch)
            .await
            .map(EnhancedGenerateContentResponse::from)
    };

    GenerateContentStreamResult {
        stream: Box::pin(stream),
        response: Box::pin(response),
    }
}
