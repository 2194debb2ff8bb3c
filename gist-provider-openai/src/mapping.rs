//! Request body mapping for the chat completions endpoint.

use gist_types::CompletionRequest;

/// Build the JSON body for a streaming chat completion.
///
/// `reasoning_effort` appears only when the request carries one.
#[must_use]
pub fn to_api_request(request: &CompletionRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": request.model,
        "messages": request.messages,
        "stream": true,
    });

    if let Some(effort) = request.reasoning_effort {
        body["reasoning_effort"] = serde_json::Value::String(effort.as_str().into());
    }

    body
}
