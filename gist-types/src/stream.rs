//! Streaming event types for incremental responses.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// Raw body of a streaming HTTP response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, CompletionError>> + Send>>;

/// One step of the response aggregator.
///
/// `text` is always the whole output accumulated so far, never a delta.
/// Once `error` is set or `terminal` is true the stream is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Cumulative output, `None` on error.
    pub text: Option<String>,
    /// Error message, if the stream failed.
    pub error: Option<String>,
    /// No further events follow.
    pub terminal: bool,
}

impl StreamEvent {
    /// Non-terminal progress carrying the cumulative text.
    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
            terminal: false,
        }
    }

    /// Natural end of stream carrying the final text.
    pub fn done(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
            terminal: true,
        }
    }

    /// Terminal failure.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            text: None,
            error: Some(error.into()),
            terminal: true,
        }
    }

    /// Whether this event ends the stream with an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Event published to a UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelEvent {
    /// Cumulative text so far. Consumers replace their display with it.
    Message {
        /// Full output so far.
        text: String,
    },
    /// The request failed. Terminal.
    Error {
        /// Human-readable message.
        text: String,
    },
    /// The request finished normally. Terminal.
    Done {
        /// Final output, `None` if the model produced nothing.
        text: Option<String>,
    },
}

impl ChannelEvent {
    /// Whether no further events follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Message { .. })
    }
}
