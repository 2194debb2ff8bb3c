use std::sync::Mutex;

use bytes::Bytes;
use futures::StreamExt;
use gist_types::*;

struct RecordingChannel {
    events: Mutex<Vec<ChannelEvent>>,
}

impl Channel for RecordingChannel {
    fn is_connected(&self) -> bool {
        true
    }

    async fn publish(&self, event: ChannelEvent) -> Result<(), ChannelError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn closed(&self) {
        std::future::pending::<()>().await
    }
}

struct FixedBody(&'static [&'static str]);

impl Transport for FixedBody {
    async fn open(
        &self,
        _api_key: &str,
        _request: &CompletionRequest,
    ) -> Result<ByteStream, CompletionError> {
        let chunks = self.0.iter().map(|c| Ok(Bytes::from_static(c.as_bytes())));
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

async fn publish_all<C: Channel>(channel: &C, events: Vec<ChannelEvent>) {
    for event in events {
        channel.publish(event).await.unwrap();
    }
}

#[tokio::test]
async fn channel_can_be_used_generically() {
    let channel = RecordingChannel {
        events: Mutex::new(Vec::new()),
    };
    publish_all(
        &channel,
        vec![
            ChannelEvent::Message { text: "Hi".into() },
            ChannelEvent::Done {
                text: Some("Hi".into()),
            },
        ],
    )
    .await;

    let events = channel.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn transport_yields_body_chunks() {
    let transport = FixedBody(&["data: a\n", "data: b\n"]);
    let request = CompletionRequest {
        model: DEFAULT_MODEL.into(),
        messages: vec![PromptMessage::user("hello")],
        reasoning_effort: None,
    };

    let body = transport.open("sk-test", &request).await.unwrap();
    let chunks: Vec<Bytes> = body.map(|c| c.unwrap()).collect().await;
    assert_eq!(chunks, vec![Bytes::from("data: a\n"), Bytes::from("data: b\n")]);
}
