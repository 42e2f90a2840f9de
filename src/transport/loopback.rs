use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{channel, HostEnd, Port, Transport, TransportError};

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Handler = dyn Fn(HostEnd) -> BoxFuture + Send + Sync;

/// In-process transport: every connection is served by `handler` on its own task.
///
/// Useful for driving UI code and tests without a helper or a card.
///
/// ```rust
/// use bloss_bridge::transport::LoopbackTransport;
/// use bloss_bridge::BlossClient;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = LoopbackTransport::new(|mut host| async move {
///     while let Some(_request) = host.recv().await {
///         let _ = host.reply(&json!({"Ok": {"ListCards": []}}));
///     }
/// });
/// let client = BlossClient::new(transport);
/// assert!(client.list_cards().await.unwrap().is_empty());
/// # }
/// ```
pub struct LoopbackTransport {
    name: String,
    handler: Arc<Handler>,
    connections: Arc<AtomicUsize>,
}

impl LoopbackTransport {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(HostEnd) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: "loopback".to_string(),
            handler: Arc::new(move |host: HostEnd| -> BoxFuture { Box::pin(handler(host)) }),
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many ports have been opened so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("name", &self.name)
            .field("connections", &self.connections())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn connect_native(&self) -> Result<Port, TransportError> {
        let id = self.connections.fetch_add(1, Ordering::SeqCst);
        let (port, host) = channel(format!("{}#{id}", self.name));
        tokio::spawn((self.handler)(host));
        Ok(port)
    }
}
