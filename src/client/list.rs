use super::BlossClient;
use crate::card::CardInfo;
use crate::command::{Command, Request};
use crate::envelope::Reply;
use crate::error::{Error, Result};
use crate::transport::{Transport, TransportError};

impl<T: Transport> BlossClient<T> {
    /// Ask the helper which cards are present.
    ///
    /// Cards come back in the order the helper enumerated them.
    pub async fn list_cards(&self) -> Result<Vec<CardInfo>> {
        let request =
            serde_json::to_value(Request::new(Command::ListCards)).map_err(TransportError::from)?;
        tracing::debug!("listing cards");

        let send = self.transport.send_native_message(request);
        let raw = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => send.await?,
        };

        match Reply::decode(raw)? {
            Reply::Cards(cards) => {
                tracing::debug!(count = cards.len(), "listed cards");
                Ok(cards)
            }
            Reply::Error(err) => {
                tracing::warn!(kind = %err.kind, "helper failed to list cards");
                Err(err.into())
            }
            other => Err(Error::UnexpectedReply {
                operation: "ListCards",
                got: other.name(),
            }),
        }
    }
}
