//! Core traits: Transport and Channel.

use std::future::Future;

use crate::error::{ChannelError, CompletionError};
use crate::stream::{ByteStream, ChannelEvent};
use crate::types::CompletionRequest;

/// Opens streaming completion responses.
///
/// Uses RPITIT (return position impl trait in trait), so it is not
/// object-safe; compose with generics `<T: Transport>`.
///
/// The API key travels with each call because it comes from the settings
/// snapshot taken at the start of every request.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response body once headers arrive.
    ///
    /// Fails with [`CompletionError::Network`] or [`CompletionError::Http`]
    /// when no streaming body is available.
    fn open(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<ByteStream, CompletionError>> + Send;
}

/// A long-lived message channel to one UI surface.
///
/// Owned by the caller; the driver only publishes to it and watches for
/// disconnection.
pub trait Channel: Send + Sync {
    /// Whether the receiving side is still attached.
    fn is_connected(&self) -> bool;

    /// Deliver one event.
    fn publish(
        &self,
        event: ChannelEvent,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Resolves once the receiving side has disconnected.
    fn closed(&self) -> impl Future<Output = ()> + Send;
}
