//! Gemini SSE stream parser.
//!
//! With `alt=sse` every event is a `data: ` line holding one complete
//! `GenerateContentResponse`. Each carries the next slice of generated text
//! and, usually on the last event, the grounding metadata.

use super::types::{GeminiError, GenerateContentResponse};
use crate::error::ModelError;
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use plastfinder_core::UpstreamFragment;
use serde::Deserialize;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Turns a raw SSE byte stream into upstream fragments.
    pub struct GeminiStreamParser<S> {
        #[pin]
        inner: S,
        // Raw bytes; only complete lines are decoded, so multi-byte
        // characters split across chunks survive.
        buffer: Vec<u8>,
        done: bool,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StreamEvent {
    Error(GeminiError),
    Response(GenerateContentResponse),
}

impl<S, E> GeminiStreamParser<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    /// Create a new stream parser.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            done: false,
        }
    }
}

impl<S, E> Stream for GeminiStreamParser<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    type Item = Result<UpstreamFragment, ModelError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            while let Some(pos) = this.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = this.buffer.drain(..=pos).collect();
                if let Some(item) = parse_line(&String::from_utf8_lossy(&line)) {
                    if item.is_err() {
                        *this.done = true;
                    }
                    return Poll::Ready(Some(item));
                }
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(ModelError::network(e.to_string()))));
                }
                Poll::Ready(None) => {
                    *this.done = true;
                    let remaining = std::mem::take(this.buffer);
                    return Poll::Ready(parse_line(&String::from_utf8_lossy(&remaining)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Parse one SSE line. `None` for lines that carry nothing to emit.
fn parse_line(line: &str) -> Option<Result<UpstreamFragment, ModelError>> {
    let line = line.trim();
    // Comments, event names and ids are not used by this API.
    let payload = line.strip_prefix("data:")?.trim_start();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(StreamEvent::Error(err)) => Some(Err(ModelError::Api {
            message: err.error.message,
            code: err.error.status,
        })),
        Ok(StreamEvent::Response(response)) => process_response(response),
        Err(e) => {
            tracing::warn!(error = %e, payload, "Failed to parse Gemini stream chunk");
            None
        }
    }
}

fn process_response(
    response: GenerateContentResponse,
) -> Option<Result<UpstreamFragment, ModelError>> {
    if response.candidates.is_empty() {
        let reason = response.prompt_feedback.and_then(|f| f.block_reason)?;
        return Some(Err(ModelError::Api {
            message: format!("Prompt blocked: {reason}"),
            code: Some(reason),
        }));
    }

    let candidate = response.candidates.into_iter().next()?;
    let text = candidate.content.map(|c| c.text()).unwrap_or_default();
    if text.is_empty() && candidate.grounding_metadata.is_none() {
        return None;
    }

    Some(Ok(UpstreamFragment {
        text,
        grounding_metadata: candidate.grounding_metadata,
    }))
}
