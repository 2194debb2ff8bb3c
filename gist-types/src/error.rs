//! Error types shared by the gist crates.

/// Message reported when no API key is configured.
pub const ERR_API_KEY: &str = "API key is not set";

/// Why a completion request failed.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Configuration is unusable (e.g. no API key). Detected before any network call.
    #[error("{0}")]
    Configuration(String),
    /// Connection, DNS or body read failure.
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code.
        status: u16,
        /// Server message, or the raw body when it carried none.
        message: String,
    },
    /// The body could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The server reported an error inside the stream.
    #[error("{0}")]
    Server(String),
    /// The consumer went away; never shown to anyone.
    #[error("consumer disconnected")]
    ConsumerGone,
}

impl CompletionError {
    /// The missing-API-key error.
    #[must_use]
    pub fn missing_api_key() -> Self {
        Self::Configuration(ERR_API_KEY.into())
    }

    /// Whether this error should be reported to the user.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::ConsumerGone)
    }
}

/// Errors from publishing to a [`Channel`](crate::Channel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The receiving side has disconnected.
    #[error("attempting to use a disconnected port")]
    Disconnected,
}

impl From<ChannelError> for CompletionError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Disconnected => Self::ConsumerGone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_message() {
        assert_eq!(CompletionError::missing_api_key().to_string(), ERR_API_KEY);
    }

    #[test]
    fn server_error_is_verbatim() {
        assert_eq!(
            CompletionError::Server("rate limited".into()).to_string(),
            "rate limited"
        );
    }

    #[test]
    fn consumer_gone_is_not_reportable() {
        let err: CompletionError = ChannelError::Disconnected.into();
        assert!(matches!(err, CompletionError::ConsumerGone));
        assert!(!err.is_reportable());
        assert!(CompletionError::Protocol("x".into()).is_reportable());
    }

    #[test]
    fn http_error_display() {
        let err = CompletionError::Http {
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Incorrect API key provided");
    }
}
