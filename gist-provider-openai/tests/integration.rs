//! Integration tests for the OpenAI transport using wiremock.

use gist_provider_openai::{OpenAi, ReaderState, ResponseReader};
use gist_types::{
    CompletionError, CompletionRequest, PromptMessage, ReasoningEffort, StreamEvent, Transport,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn request(model: &str, effort: Option<ReasoningEffort>) -> CompletionRequest {
    CompletionRequest {
        model: model.into(),
        messages: vec![
            PromptMessage::system("You are a browser extension."),
            PromptMessage::user("Summarize this text."),
        ],
        reasoning_effort: effort,
    }
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let record = serde_json::json!({
            "id": "chatcmpl-abc",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": fragment}, "finish_reason": null}]
        });
        body.push_str(&format!("data: {record}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

async fn drain(mut reader: ResponseReader) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    loop {
        let event = reader.next().await;
        let terminal = event.terminal;
        events.push(event);
        if terminal {
            return events;
        }
    }
}

#[tokio::test]
async fn streams_completion_with_bearer_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "messages": [
                {"role": "system", "content": "You are a browser extension."},
                {"role": "user", "content": "Summarize this text."}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["The page ", "is about ", "Rust."]), "text/event-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAi::new().base_url(mock_server.uri());
    let body = client
        .open("test-api-key", &request("gpt-4o-mini", None))
        .await
        .expect("stream should open");

    let events = drain(ResponseReader::new(body)).await;
    let last = events.last().unwrap();
    assert_eq!(last, &StreamEvent::done("The page is about Rust."));
    assert!(events.iter().all(|e| e.error.is_none()));
}

#[tokio::test]
async fn reasoning_effort_is_sent_when_requested() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "o3-mini",
            "reasoning_effort": "low"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["ok"]), "text/event-stream"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAi::new().base_url(mock_server.uri());
    let body = client
        .open("k", &request("o3-mini", Some(ReasoningEffort::Low)))
        .await
        .unwrap();
    let events = drain(ResponseReader::new(body)).await;
    assert_eq!(events.last().unwrap(), &StreamEvent::done("ok"));
}

#[tokio::test]
async fn reasoning_effort_is_absent_when_not_requested() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&[]), "text/event-stream"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAi::new().base_url(mock_server.uri());
    let body = client.open("k", &request("gpt-4o", None)).await.unwrap();
    drop(body);

    let received: Vec<Request> = mock_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(sent.get("reasoning_effort").is_none());
    assert_eq!(sent["stream"], true);
}

#[tokio::test]
async fn sends_organization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("openai-organization", "org-abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(&["x"]), "text/event-stream"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAi::new()
        .base_url(mock_server.uri())
        .organization("org-abc123");
    assert!(client.open("k", &request("gpt-4o", None)).await.is_ok());
}

#[tokio::test]
async fn unauthorized_status_maps_to_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Incorrect API key provided: sk-bad.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = OpenAi::new().base_url(mock_server.uri());
    match client.open("sk-bad", &request("gpt-4o", None)).await {
        Err(CompletionError::Http { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided: sk-bad.");
        }
        Err(other) => panic!("expected Http error, got {other:?}"),
        Ok(_) => panic!("expected Http error, got a stream"),
    }
}

#[tokio::test]
async fn error_record_in_stream_fails_reader() {
    let mock_server = MockServer::start().await;

    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Part\"}}]}\n\n\
                data: {\"error\":{\"message\":\"The server had an error while processing your request.\"}}\n\n";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let client = OpenAi::new().base_url(mock_server.uri());
    let stream = client.open("k", &request("gpt-4o", None)).await.unwrap();
    let mut reader = ResponseReader::new(stream);
    let events = {
        let mut events = Vec::new();
        loop {
            let event = reader.next().await;
            let terminal = event.terminal;
            events.push(event);
            if terminal {
                break events;
            }
        }
    };

    assert_eq!(
        events.last().unwrap(),
        &StreamEvent::failed("The server had an error while processing your request.")
    );
    assert_eq!(reader.state(), ReaderState::Failed);
    assert!(!reader.holds_body());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Grab a free port, then release it so nothing listens there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = OpenAi::new().base_url(format!("http://127.0.0.1:{port}"));
    let result = client.open("k", &request("gpt-4o", None)).await;
    assert!(matches!(result, Err(CompletionError::Network(_))));
}
