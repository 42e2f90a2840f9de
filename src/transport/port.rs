use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::TransportError;

/// Something that arrived on a [`Port`].
#[derive(Debug, Clone, PartialEq)]
pub enum PortEvent {
    Message(Value),
    /// The helper side went away. Carries the transport's reason when it has one.
    Disconnected(Option<String>),
}

/// Create a connected pair: the client's [`Port`] and the helper-facing [`HostEnd`].
///
/// Both queues exist from the moment the pair is created, so a reply sent right
/// after the request is posted is buffered until the client asks for it.
pub fn channel(name: impl Into<String>) -> (Port, HostEnd) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let port = Port {
        name: name.into(),
        outbound: Some(out_tx),
        inbound: in_rx,
    };
    let host = HostEnd {
        requests: out_rx,
        replies: in_tx,
    };
    (port, host)
}

/// Client end of a persistent channel to a helper.
///
/// Dropping the port disconnects it.
#[derive(Debug)]
pub struct Port {
    name: String,
    outbound: Option<mpsc::UnboundedSender<Value>>,
    inbound: mpsc::UnboundedReceiver<PortEvent>,
}

impl Port {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Queue a message for the helper.
    ///
    /// If the helper side is already gone, the disconnect it left behind (and
    /// its reason) is reported instead of a bare [`TransportError::Closed`].
    pub fn post_message<T: Serialize + ?Sized>(&mut self, msg: &T) -> Result<(), TransportError> {
        let tx = self.outbound.as_ref().ok_or(TransportError::Closed)?;
        let value = serde_json::to_value(msg)?;
        if tx.send(value).is_ok() {
            return Ok(());
        }
        while let Ok(event) = self.inbound.try_recv() {
            if let PortEvent::Disconnected(reason) = event {
                return Err(TransportError::Disconnected(reason));
            }
        }
        Err(TransportError::Closed)
    }

    /// Wait for the next message or disconnect notification.
    ///
    /// After [`disconnect`](Self::disconnect) this returns `Disconnected(None)` right away.
    pub async fn recv(&mut self) -> PortEvent {
        if self.outbound.is_none() {
            return PortEvent::Disconnected(None);
        }
        self.inbound
            .recv()
            .await
            .unwrap_or(PortEvent::Disconnected(None))
    }

    /// Close the channel. Returns `true` for the call that actually closed it;
    /// later calls do nothing.
    pub fn disconnect(&mut self) -> bool {
        match self.outbound.take() {
            Some(_) => {
                self.inbound.close();
                tracing::debug!(port = %self.name, "port disconnected");
                true
            }
            None => false,
        }
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Helper-facing end of a channel, driven by a transport.
#[derive(Debug)]
pub struct HostEnd {
    requests: mpsc::UnboundedReceiver<Value>,
    replies: mpsc::UnboundedSender<PortEvent>,
}

impl HostEnd {
    /// Next message posted by the client, or `None` once the client disconnected.
    pub async fn recv(&mut self) -> Option<Value> {
        self.requests.recv().await
    }

    /// Deliver a message to the client.
    pub fn reply<T: Serialize + ?Sized>(&self, msg: &T) -> Result<(), TransportError> {
        let value = serde_json::to_value(msg)?;
        self.replies
            .send(PortEvent::Message(value))
            .map_err(|_| TransportError::Closed)
    }

    /// A handle that can deliver replies independently of [`recv`](Self::recv).
    pub fn replier(&self) -> Replier {
        Replier {
            replies: self.replies.clone(),
        }
    }

    /// Notify the client that the helper side is gone.
    pub fn disconnect(self, reason: Option<String>) {
        let _ = self.replies.send(PortEvent::Disconnected(reason));
    }
}

/// Cloneable sending half of a [`HostEnd`].
#[derive(Debug, Clone)]
pub struct Replier {
    replies: mpsc::UnboundedSender<PortEvent>,
}

impl Replier {
    pub fn send(&self, event: PortEvent) -> Result<(), TransportError> {
        self.replies.send(event).map_err(|_| TransportError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.replies.is_closed()
    }
}
