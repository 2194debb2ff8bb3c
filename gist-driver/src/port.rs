//! In-process channel to a UI surface.

use std::future::Future;

use gist_types::{Channel, ChannelError, ChannelEvent};
use tokio::sync::mpsc;

/// Sending half of a port.
///
/// The receiving UI surface holds the [`mpsc::UnboundedReceiver`]; dropping
/// it disconnects the port, which the driver observes as cancellation.
#[derive(Debug, Clone)]
pub struct PortChannel {
    tx: mpsc::UnboundedSender<ChannelEvent>,
}

impl PortChannel {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::UnboundedSender<ChannelEvent>) -> Self {
        Self { tx }
    }
}

/// Open a new port. The receiver belongs to the consuming surface.
pub fn port() -> (PortChannel, mpsc::UnboundedReceiver<ChannelEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PortChannel::new(tx), rx)
}

impl Channel for PortChannel {
    fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }

    fn publish(
        &self,
        event: ChannelEvent,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        let result = self.tx.send(event).map_err(|_| ChannelError::Disconnected);
        async move { result }
    }

    fn closed(&self) -> impl Future<Output = ()> + Send {
        self.tx.closed()
    }
}
