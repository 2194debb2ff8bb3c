//! OpenAI API client struct and builder.

use std::future::Future;

use futures::StreamExt;
use gist_types::{ByteStream, CompletionError, CompletionRequest, Transport};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::to_api_request;

/// Default OpenAI API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Streaming client for the OpenAI Chat Completions API.
///
/// Implements [`Transport`]. The API key is supplied per request, so one
/// client serves every settings snapshot.
///
/// # Example
///
/// ```no_run
/// use gist_provider_openai::OpenAi;
///
/// let client = OpenAi::new()
///     .base_url("https://api.openai.com")
///     .organization("org-...");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAi {
    /// API base URL (override for testing or proxies).
    pub(crate) base_url: String,
    /// Optional organization ID for multi-org accounts.
    pub(crate) organization: Option<String>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl OpenAi {
    /// Create a client pointed at the public API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            organization: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or an API proxy.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the OpenAI organization ID.
    ///
    /// Sent as the `OpenAI-Organization` header on every request.
    #[must_use]
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the chat completions endpoint URL.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl Default for OpenAi {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for OpenAi {
    /// Send a streaming chat completion request.
    ///
    /// Resolves once response headers arrive. A non-success status is read
    /// in full and returned as [`CompletionError::Http`].
    fn open(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<ByteStream, CompletionError>> + Send {
        let url = self.completions_url();
        let body = to_api_request(request);

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        async move {
            tracing::debug!(url = %url, model = %body["model"], "sending streaming completion request");

            let response = builder.send().await.map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body_text = response.text().await.map_err(map_reqwest_error)?;
                tracing::warn!(status = status.as_u16(), "completion request rejected");
                return Err(map_http_status(status, &body_text));
            }

            Ok(body_stream(response))
        }
    }
}

/// Expose the response body as a [`ByteStream`].
fn body_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_is_set() {
        let client = OpenAi::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn builder_overrides_base_url() {
        let client = OpenAi::new().base_url("http://localhost:9999");
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let client = OpenAi::new().base_url("http://localhost:9999/");
        assert_eq!(
            client.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn builder_sets_organization() {
        let client = OpenAi::new().organization("org-abc123");
        assert_eq!(client.organization, Some("org-abc123".to_string()));
    }

    #[test]
    fn organization_default_is_none() {
        assert!(OpenAi::default().organization.is_none());
    }
}
