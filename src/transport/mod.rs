//! Channels to the helper process.
//!
//! A [`Transport`] knows how to open a [`Port`] to the helper. The one-shot
//! primitive ([`Transport::send_native_message`]) is built on top of it: open,
//! post, take exactly one message, close.

pub mod loopback;
pub mod port;
pub mod process;

use async_trait::async_trait;
use serde_json::Value;
use std::io;
use thiserror::Error;

pub use loopback::LoopbackTransport;
pub use port::{channel, HostEnd, Port, PortEvent, Replier};
pub use process::ProcessTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to launch native host: {0}")]
    Launch(#[source] io::Error),
    #[error("native host disconnected")]
    Disconnected(Option<String>),
    #[error("port is closed")]
    Closed,
    #[error("message could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new persistent channel to the helper.
    async fn connect_native(&self) -> Result<Port, TransportError>;

    /// Send a single message and wait for a single reply.
    async fn send_native_message(&self, message: Value) -> Result<Value, TransportError> {
        let mut port = self.connect_native().await?;
        port.post_message(&message)?;
        let reply = match port.recv().await {
            PortEvent::Message(reply) => Ok(reply),
            PortEvent::Disconnected(reason) => Err(TransportError::Disconnected(reason)),
        };
        port.disconnect();
        reply
    }
}
