//! Errors from settings storage.

use thiserror::Error;

/// Settings storage errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing store could not be read.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// The backing store could not be written.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The stored document is not valid settings JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
