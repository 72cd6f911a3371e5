//! Server-sent-event frame decoding for Gemini streaming responses.
//!
//! With `alt=sse` the `streamGenerateContent` endpoint writes one response
//! object per frame:
//! ```text
//! data: {"candidates":[...]}
//!
//! data: {"candidates":[...],"usageMetadata":{...}}
//!
//! ```
//! Frames end with a blank line; proxies may rewrite it as `\n\n`, `\r\r`
//! or `\r\n\r\n`. Network reads split the text at arbitrary points, so the
//! decoder keeps the unconsumed tail in a buffer between reads.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::Stream;
use futures::ready;

use crate::error::{GeminiError, GeminiResult, ResponseError};
use crate::types::GenerateContentResponse;

/// Marker that opens every frame.
const FRAME_MARKER: &str = "data: ";

/// Accepted frame terminators, in matching order.
const FRAME_TERMINATORS: [&str; 3] = ["\n\n", "\r\r", "\r\n\r\n"];

/// Byte stream handed to the decoder by the transport layer.
pub type ByteStream = Pin<Box<dyn Stream<Item = GeminiResult<Bytes>> + Send>>;

/// Outcome of looking for one frame at the front of the buffer.
#[derive(Debug, PartialEq)]
enum FrameMatch {
    /// A full frame: payload range and total length consumed.
    Complete { payload_end: usize, consumed: usize },
    /// The buffer may still become a frame once more text arrives.
    Incomplete,
}

/// Incremental parser for `data: <json>` frames.
///
/// The decoder owns an accumulation buffer. Text is pushed in whatever pieces
/// the network delivers and complete frames are pulled out one at a time with
/// [`SseFrameDecoder::next_frame`]. It knows nothing about streams or tasks,
/// which keeps it usable from synchronous code and tests.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    /// Text received but not yet consumed by a complete frame.
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across reads.
    partial_utf8: Vec<u8>,
    /// Number of frames decoded so far.
    frames: usize,
}

impl SseFrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames successfully decoded so far.
    pub fn frames_decoded(&self) -> usize {
        self.frames
    }

    /// Text currently buffered and not yet part of a complete frame.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append raw bytes to the buffer.
    ///
    /// A multi-byte character split across two reads is held back until the
    /// rest of it arrives. Bytes that can never be valid UTF-8 are an error.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> GeminiResult<()> {
        self.partial_utf8.extend_from_slice(bytes);

        match std::str::from_utf8(&self.partial_utf8) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.partial_utf8.clear();
                Ok(())
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let tail = self.partial_utf8.split_off(valid);
                // Everything before `valid` was checked by from_utf8 above.
                self.buffer.push_str(&String::from_utf8_lossy(&self.partial_utf8));
                self.partial_utf8 = tail;
                Ok(())
            }
            Err(e) => {
                let payload = String::from_utf8_lossy(&self.partial_utf8).into_owned();
                self.partial_utf8.clear();
                Err(GeminiError::Response(ResponseError::MalformedChunk {
                    message: format!("Invalid UTF-8 in stream: {}", e),
                    payload,
                }))
            }
        }
    }

    /// Append already-decoded text to the buffer.
    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Remove the next complete frame from the buffer and parse its payload.
    ///
    /// Returns `None` when the buffer holds no complete frame yet. Any `\r` or
    /// `\n` before a frame is skipped, which is more lenient than a strict
    /// frame grammar.
    pub fn next_frame(&mut self) -> Option<GeminiResult<GenerateContentResponse>> {
        // Blank lines between frames (keep-alives, doubled terminators).
        let leading = self.buffer.len() - self.buffer.trim_start_matches(['\r', '\n']).len();
        if leading > 0 {
            self.buffer.drain(..leading);
        }

        let (payload_end, consumed) = match match_frame(&self.buffer) {
            FrameMatch::Complete { payload_end, consumed } => (payload_end, consumed),
            FrameMatch::Incomplete => return None,
        };

        let frame: String = self.buffer.drain(..consumed).collect();
        let payload = &frame[FRAME_MARKER.len()..payload_end];

        match serde_json::from_str::<GenerateContentResponse>(payload) {
            Ok(response) => {
                self.frames += 1;
                tracing::trace!(frame = self.frames, bytes = payload.len(), "Decoded stream frame");
                Some(Ok(response))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Stream frame payload is not a valid response");
                Some(Err(GeminiError::Response(ResponseError::MalformedChunk {
                    message: e.to_string(),
                    payload: payload.to_string(),
                })))
            }
        }
    }

    /// Feed text and collect every frame it completes.
    pub fn feed(&mut self, text: &str) -> Vec<GeminiResult<GenerateContentResponse>> {
        self.push_str(text);

        let mut results = Vec::new();
        while let Some(result) = self.next_frame() {
            let failed = result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }
        results
    }

    /// Signal end of input.
    ///
    /// Succeeds only when nothing but whitespace is left over; a frame that
    /// never completed is reported rather than dropped.
    pub fn finish(&mut self) -> GeminiResult<()> {
        if !self.partial_utf8.is_empty() {
            let remainder = format!(
                "{}{}",
                self.buffer,
                String::from_utf8_lossy(&self.partial_utf8)
            );
            self.partial_utf8.clear();
            self.buffer.clear();
            return Err(GeminiError::Response(ResponseError::IncompleteFrame { remainder }));
        }

        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return Ok(());
        }

        let remainder = std::mem::take(&mut self.buffer);
        Err(GeminiError::Response(ResponseError::IncompleteFrame { remainder }))
    }
}

/// Match one frame at the start of `buffer`.
///
/// The payload runs from the marker to the first line break; it must be
/// followed immediately by one of the accepted terminators. Anything that is
/// not a frame is left in place and will surface when the stream closes.
fn match_frame(buffer: &str) -> FrameMatch {
    if !buffer.starts_with(FRAME_MARKER) {
        return FrameMatch::Incomplete;
    }

    let Some(offset) = buffer[FRAME_MARKER.len()..].find(['\r', '\n']) else {
        return FrameMatch::Incomplete;
    };
    let payload_end = FRAME_MARKER.len() + offset;
    let rest = &buffer[payload_end..];

    FRAME_TERMINATORS
        .iter()
        .find(|terminator| rest.starts_with(**terminator))
        .map_or(FrameMatch::Incomplete, |terminator| FrameMatch::Complete {
            payload_end,
            consumed: payload_end + terminator.len(),
        })
}

/// Stream adapter that decodes a byte stream into response fragments.
///
/// Yields one [`GenerateContentResponse`] per frame, in wire order. The first
/// error (upstream, malformed payload or incomplete tail) is yielded once and
/// ends the stream; fragments yielded before it stay valid.
pub struct ResponseDecoder {
    /// The underlying byte stream from the HTTP response.
    inner: ByteStream,
    /// Frame parser and its buffer.
    decoder: SseFrameDecoder,
    /// The inner stream has ended.
    exhausted: bool,
    /// Nothing more will be yielded.
    done: bool,
}

impl ResponseDecoder {
    /// Create a decoder over a byte stream.
    pub fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            decoder: SseFrameDecoder::new(),
            exhausted: false,
            done: false,
        }
    }

    /// Number of frames decoded so far.
    pub fn frames_decoded(&self) -> usize {
        self.decoder.frames_decoded()
    }

    fn fail(&mut self, error: GeminiError) -> Poll<Option<GeminiResult<GenerateContentResponse>>> {
        self.done = true;
        Poll::Ready(Some(Err(error)))
    }
}

impl Stream for ResponseDecoder {
    type Item = GeminiResult<GenerateContentResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(result) = this.decoder.next_frame() {
                return match result {
                    Ok(response) => Poll::Ready(Some(Ok(response))),
                    Err(e) => this.fail(e),
                };
            }

            if this.exhausted {
                this.done = true;
                return match this.decoder.finish() {
                    Ok(()) => {
                        tracing::debug!(frames = this.decoder.frames_decoded(), "Response stream completed");
                        Poll::Ready(None)
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Response stream ended mid-frame");
                        Poll::Ready(Some(Err(e)))
                    }
                };
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => {
                    if let Err(e) = this.decoder.push_bytes(&bytes) {
                        return this.fail(e);
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Upstream byte stream failed");
                    return this.fail(e);
                }
                None => this.exhausted = true,
            }
        }
    }
}
