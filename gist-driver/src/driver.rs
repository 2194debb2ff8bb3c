//! The completion request driver.
//!
//! One call to [`Driver::fetch_and_stream`] serves one request for one
//! consumer: it opens the stream, pulls the aggregator to a terminal
//! event and republishes progress as [`ChannelEvent`]s.

use gist_provider_openai::ResponseReader;
use gist_types::{
    Channel, ChannelError, ChannelEvent, CompletionError, CompletionRequest, Profile,
    PromptMessage, Settings, StreamEvent, Transport, is_reasoning_model,
};

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `DONE` was published. Carries the final text, `None` if empty.
    Completed(Option<String>),
    /// `ERROR` was published with this message.
    Failed(String),
    /// The consumer disconnected; nothing further was published.
    Cancelled,
}

/// Drives streaming completions over a [`Transport`].
///
/// Holds no per-request state, so one driver can serve concurrent
/// requests from behind an `Arc`.
pub struct Driver<T: Transport> {
    transport: T,
}

impl<T: Transport> Driver<T> {
    /// Create a driver over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one completion and publish its events to `channel`.
    ///
    /// Publishes zero or more `MESSAGE`s with the cumulative text, then
    /// exactly one `ERROR` or `DONE`, unless the consumer disconnects
    /// first. Without an API key a single `ERROR` is published and the
    /// transport is never called.
    pub async fn fetch_and_stream<C: Channel>(
        &self,
        channel: &C,
        settings: &Settings,
        profile: &Profile,
        messages: Vec<PromptMessage>,
    ) -> Outcome {
        let Some(api_key) = settings.api_key() else {
            return fail(channel, CompletionError::missing_api_key()).await;
        };

        let request = completion_request(profile, messages);
        for message in &request.messages {
            tracing::debug!(role = ?message.role, content = %message.content, "prompt message");
        }

        let opened = tokio::select! {
            biased;
            () = channel.closed() => return Outcome::Cancelled,
            opened = self.transport.open(api_key, &request) => opened,
        };
        let body = match opened {
            Ok(body) => body,
            Err(err) => return fail(channel, err).await,
        };

        let mut reader = ResponseReader::new(body);
        loop {
            let polled = tokio::select! {
                biased;
                () = channel.closed() => None,
                event = reader.next() => Some(event),
            };
            let Some(event) = polled else {
                reader.cancel();
                tracing::debug!(model = %request.model, "consumer disconnected mid-stream");
                return Outcome::Cancelled;
            };

            let (published, outcome) = match to_channel_event(event) {
                Some(ChannelEvent::Error { text }) => {
                    tracing::warn!(model = %request.model, error = %text, "completion failed");
                    let event = ChannelEvent::Error { text: text.clone() };
                    let published = publish(channel, event).await;
                    (published, Some(Outcome::Failed(text)))
                }
                Some(ChannelEvent::Done { text }) => {
                    let event = ChannelEvent::Done { text: text.clone() };
                    let published = publish(channel, event).await;
                    (published, Some(Outcome::Completed(text)))
                }
                Some(message) => (publish(channel, message).await, None),
                None => (Ok(()), None),
            };

            if published.is_err() {
                reader.cancel();
                return Outcome::Cancelled;
            }
            if let Some(outcome) = outcome {
                return outcome;
            }
        }
    }
}

/// Assemble the wire request. Only reasoning models carry an effort.
pub fn completion_request(profile: &Profile, messages: Vec<PromptMessage>) -> CompletionRequest {
    let reasoning_effort = is_reasoning_model(&profile.model)
        .then(|| profile.reasoning.unwrap_or_default());
    CompletionRequest {
        model: profile.model.clone(),
        messages,
        reasoning_effort,
    }
}

fn to_channel_event(event: StreamEvent) -> Option<ChannelEvent> {
    if let Some(error) = event.error {
        return Some(ChannelEvent::Error { text: error });
    }
    if event.terminal {
        return Some(ChannelEvent::Done {
            text: event.text.filter(|t| !t.is_empty()),
        });
    }
    event.text.map(|text| ChannelEvent::Message { text })
}

/// Publish unless the consumer is already gone.
async fn publish<C: Channel>(channel: &C, event: ChannelEvent) -> Result<(), ChannelError> {
    if !channel.is_connected() {
        return Err(ChannelError::Disconnected);
    }
    channel.publish(event).await
}

/// Report `err` as the request's single `ERROR`.
pub(crate) async fn fail<C: Channel>(channel: &C, err: CompletionError) -> Outcome {
    if !err.is_reportable() {
        return Outcome::Cancelled;
    }
    let text = user_message(&err);
    tracing::warn!(error = %err, "completion request failed");
    match publish(channel, ChannelEvent::Error { text: text.clone() }).await {
        Ok(()) => Outcome::Failed(text),
        Err(_) => Outcome::Cancelled,
    }
}

/// Status errors surface the server's own message.
fn user_message(err: &CompletionError) -> String {
    match err {
        CompletionError::Http { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
