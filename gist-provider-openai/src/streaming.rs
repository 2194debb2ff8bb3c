//! Aggregation of the streamed chat-completions body.
//!
//! [`ResponseReader`] pulls chunks from the response body, feeds them to a
//! [`ChunkDecoder`], and keeps the single accumulated output buffer. Each
//! call to [`ResponseReader::next`] yields the whole text so far:
//!
//! ```text
//! {text: "Hello",               terminal: false}
//! {text: "Hello, how are",      terminal: false}
//! {text: "Hello, how are you?", terminal: true}
//! ```
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat/streaming>

use std::collections::VecDeque;

use futures::{Stream, StreamExt};
use gist_types::{ByteStream, CompletionError, StreamEvent};
use serde_json::Value;

use crate::decoder::{ChunkDecoder, Record, reports_error};

/// Where a [`ResponseReader`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Not polled yet.
    Idle,
    /// Consuming the body.
    Reading,
    /// Sentinel or end of body reached.
    Done,
    /// The server or the transport reported an error.
    Failed,
    /// Stopped from outside before the body finished.
    Cancelled,
}

impl ReaderState {
    /// Whether no further distinct events can be produced.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// Outcome of applying one record.
enum Step {
    Nothing,
    Grew,
    Terminal(StreamEvent),
}

/// Pull-based aggregator over one streamed response.
///
/// Owns the response body exclusively. The body is released exactly once,
/// as soon as the reader reaches a terminal state or is cancelled, and at
/// the latest when the reader is dropped.
pub struct ResponseReader {
    body: Option<ByteStream>,
    decoder: ChunkDecoder,
    /// Decoded records not yet turned into events.
    pending: VecDeque<Record>,
    text: String,
    state: ReaderState,
    terminal: Option<StreamEvent>,
}

impl ResponseReader {
    /// Wrap a response body. Nothing is read until the first [`next`](Self::next).
    pub fn new(body: ByteStream) -> Self {
        Self {
            body: Some(body),
            decoder: ChunkDecoder::new(),
            pending: VecDeque::new(),
            text: String::new(),
            state: ReaderState::Idle,
            terminal: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Output accumulated so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the body is still held.
    #[must_use]
    pub fn holds_body(&self) -> bool {
        self.body.is_some()
    }

    /// Read until the output grows or the stream ends.
    ///
    /// Every record that adds content yields one event, even when several
    /// arrive in the same chunk. Reads that add no content (role-only
    /// deltas, keep-alive comments, unparseable fragments) produce no
    /// event; the reader keeps reading. After a terminal event every call
    /// returns that same event again.
    pub async fn next(&mut self) -> StreamEvent {
        if let Some(event) = &self.terminal {
            return event.clone();
        }
        self.state = ReaderState::Reading;

        loop {
            while let Some(record) = self.pending.pop_front() {
                match self.apply(record) {
                    Step::Terminal(event) => return event,
                    Step::Grew => return StreamEvent::progress(self.text.clone()),
                    Step::Nothing => {}
                }
            }

            let Some(body) = self.body.as_mut() else {
                return self.settle(StreamEvent::done(self.text.clone()), ReaderState::Done);
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    let records = self.decoder.decode(&chunk);
                    self.pending.extend(records);
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "response body read failed");
                    return self.settle(StreamEvent::failed(err.to_string()), ReaderState::Failed);
                }
                None => {
                    self.release();
                    let records = self.decoder.finish();
                    self.pending.extend(records);
                }
            }
        }
    }

    /// Stop reading and release the body.
    ///
    /// Later calls to [`next`](Self::next) return a terminal event without
    /// touching the network. Has no effect once the reader is terminal.
    pub fn cancel(&mut self) {
        if self.terminal.is_none() {
            self.settle(
                StreamEvent::failed(CompletionError::ConsumerGone.to_string()),
                ReaderState::Cancelled,
            );
        }
    }

    /// Consume the reader as a stream of events ending with the terminal one.
    pub fn into_events(self) -> impl Stream<Item = StreamEvent> + Send {
        async_stream::stream! {
            let mut reader = self;
            loop {
                let event = reader.next().await;
                let terminal = event.terminal;
                yield event;
                if terminal {
                    break;
                }
            }
        }
    }

    fn apply(&mut self, record: Record) -> Step {
        match record {
            Record::Done => {
                let event = StreamEvent::done(self.text.clone());
                Step::Terminal(self.settle(event, ReaderState::Done))
            }
            Record::Payload(value) => {
                if let Some(message) = error_message(&value) {
                    tracing::debug!(error = %message, "server reported an error");
                    let event = StreamEvent::failed(message);
                    return Step::Terminal(self.settle(event, ReaderState::Failed));
                }
                match content_delta(&value) {
                    Some(content) => {
                        self.text.push_str(content);
                        Step::Grew
                    }
                    None => Step::Nothing,
                }
            }
        }
    }

    fn settle(&mut self, event: StreamEvent, state: ReaderState) -> StreamEvent {
        self.state = state;
        self.release();
        self.terminal = Some(event.clone());
        event
    }

    fn release(&mut self) {
        if let Some(body) = self.body.take() {
            drop(body);
            tracing::debug!(state = ?self.state, "released response body");
        }
    }
}

impl Drop for ResponseReader {
    fn drop(&mut self) {
        self.release();
    }
}

/// The error message carried by a payload, if it reports one.
fn error_message(value: &Value) -> Option<String> {
    if !reports_error(value) {
        return None;
    }
    let message = match &value["error"] {
        Value::String(s) => s.clone(),
        other => other["message"]
            .as_str()
            .unwrap_or("unknown streaming error")
            .to_string(),
    };
    Some(message)
}

/// The text fragment carried by `choices[0].delta.content`.
fn content_delta(value: &Value) -> Option<&str> {
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
}
