//! Internal error helpers for mapping HTTP/reqwest errors to [`CompletionError`].

use gist_types::CompletionError;

/// Map a non-success HTTP status (from the OpenAI API) to a [`CompletionError`].
///
/// The message is the body's `error.message` when the body is an OpenAI
/// error object, otherwise the trimmed body, otherwise the status reason.
///
/// Reference: <https://platform.openai.com/docs/guides/error-codes>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> CompletionError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    CompletionError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Map a [`reqwest::Error`] to a [`CompletionError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> CompletionError {
    CompletionError::Network(Box::new(err))
}
