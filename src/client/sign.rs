use super::BlossClient;
use crate::command::{Command, Request, SignRequest};
use crate::envelope::Reply;
use crate::error::{Error, Result};
use crate::transport::{Port, PortEvent, Transport};

/// Lifecycle of one signing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Opening,
    AwaitingReply,
    Closed,
}

/// A signing exchange bound to its own port. The port is closed on every exit.
struct SignSession {
    port: Port,
    state: SessionState,
    touches: usize,
}

impl SignSession {
    async fn open<T: Transport + ?Sized>(transport: &T) -> Result<Self> {
        let port = transport.connect_native().await?;
        Ok(Self {
            port,
            state: SessionState::Opening,
            touches: 0,
        })
    }

    async fn run<F: FnMut()>(&mut self, request: &Request, mut on_touch: F) -> Result<Vec<u8>> {
        self.port.post_message(request)?;
        self.state = SessionState::AwaitingReply;

        loop {
            let raw = match self.port.recv().await {
                PortEvent::Message(raw) => raw,
                PortEvent::Disconnected(reason) => {
                    tracing::warn!(?reason, "native host disconnected during signing");
                    return Err(Error::Disconnected { reason });
                }
            };
            match Reply::decode(raw)? {
                Reply::AwaitTouch => {
                    self.touches += 1;
                    tracing::debug!(touches = self.touches, "awaiting touch confirmation");
                    on_touch();
                }
                Reply::Signature(signature) => {
                    tracing::debug!(len = signature.len(), "message signed");
                    return Ok(signature);
                }
                Reply::Error(err) => {
                    tracing::warn!(kind = %err.kind, "helper failed to sign");
                    return Err(err.into());
                }
                other => {
                    return Err(Error::UnexpectedReply {
                        operation: "SignMessage",
                        got: other.name(),
                    })
                }
            }
        }
    }

    fn close(&mut self) {
        if self.port.disconnect() {
            tracing::trace!(from = ?self.state, touches = self.touches, "signing session closed");
        }
        self.state = SessionState::Closed;
    }
}

impl<T: Transport> BlossClient<T> {
    /// Sign `message` with the card identified by `aid`.
    ///
    /// `on_touch` runs each time the helper reports it is waiting for the user to
    /// touch the card; it may never run if the card has no touch policy. The PIN
    /// goes out in the request and is wiped from memory once the call returns.
    pub async fn sign_message<F>(
        &self,
        aid: &str,
        message: &[u8],
        pin: &[u8],
        on_touch: F,
    ) -> Result<Vec<u8>>
    where
        F: FnMut(),
    {
        let request = Request::new(Command::SignMessage(SignRequest::new(aid, message, pin)));
        tracing::debug!(aid, message_len = message.len(), "signing message");

        let mut session = SignSession::open(&self.transport).await?;
        let outcome = match self.sign_timeout {
            Some(limit) => tokio::time::timeout(limit, session.run(&request, on_touch))
                .await
                .unwrap_or(Err(Error::Timeout(limit))),
            None => session.run(&request, on_touch).await,
        };
        session.close();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LoopbackTransport;
    use serde_json::json;

    #[tokio::test]
    async fn session_moves_through_states() {
        let transport = LoopbackTransport::new(|mut host| async move {
            if host.recv().await.is_some() {
                let _ = host.reply(&json!({"Ok": "AwaitTouch"}));
                let _ = host.reply(&json!({"Ok": {"SignMessage": [9]}}));
            }
        });
        let mut session = SignSession::open(&transport).await.unwrap();
        assert_eq!(session.state, SessionState::Opening);

        let request = Request::new(Command::SignMessage(SignRequest::new("D276", b"m", b"1")));
        let signature = session.run(&request, || {}).await.unwrap();
        assert_eq!(signature, vec![9]);
        assert_eq!(session.state, SessionState::AwaitingReply);
        assert_eq!(session.touches, 1);

        session.close();
        assert_eq!(session.state, SessionState::Closed);
        assert!(!session.port.is_connected());
        // Already closed: neither a second close nor a direct disconnect closes again.
        session.close();
        assert_eq!(session.state, SessionState::Closed);
        assert!(!session.port.disconnect());
    }
}
