//! Streaming support for Gemini API responses.
//!
//! This module turns the body of a `streamGenerateContent?alt=sse` call into:
//! - a live stream of response fragments, one per server-sent-event frame
//! - a deferred aggregate equal to what the non-streamed call returns
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──► ResponseDecoder ──► fork ──┬─► branch A ──► StreamAccumulator ──► response
//!                                      └─► branch B ──► enhancer ───────────► stream
//! ```
//!
//! The `ResponseDecoder` buffers partial frames across network reads. `fork`
//! hands every decoded fragment to both branches through per-branch queues,
//! so the caller can iterate the live stream at any pace (or drop it) while
//! the aggregate still completes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use integrations_gemini_stream::streaming::process_byte_stream;
//! use futures::StreamExt;
//!
//! async fn print_stream(
//!     body: impl futures::Stream<Item = integrations_gemini_stream::GeminiResult<bytes::Bytes>> + Send + 'static,
//! ) -> integrations_gemini_stream::GeminiResult<()> {
//!     let mut result = process_byte_stream(body);
//!
//!     while let Some(fragment) = result.stream.next().await {
//!         print!("{}", fragment?.text()?);
//!     }
//!
//!     let response = result.response.await?;
//!     println!("\nusage: {:?}", response.usage_metadata());
//!     Ok(())
//! }
//! ```

mod accumulator;
mod decoder;
mod enhancer;
mod fork;
mod process;

pub use accumulator::{aggregate_responses, aggregate_stream, StreamAccumulator};
pub use decoder::{ByteStream, ResponseDecoder, SseFrameDecoder};
pub use enhancer::EnhancedGenerateContentResponse;
pub use fork::{fork, Branch};
pub use process::{
    process_byte_stream, process_stream, AggregatedResponse, EnhancedResponseStream,
    GenerateContentStreamResult,
};
