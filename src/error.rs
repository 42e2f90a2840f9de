use thiserror::Error;

use crate::envelope::{BlossError, DecodeError};
use crate::transport::TransportError;

/// Why a [`BlossClient`](crate::BlossClient) call did not produce a result.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The helper answered with an `Error` reply.
    #[error("helper reported {0}")]
    Bloss(#[from] BlossError),

    /// The reply did not follow the envelope contract.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A well-formed reply that makes no sense for the operation in flight.
    #[error("unexpected {got} reply to {operation}")]
    UnexpectedReply {
        operation: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    Transport(TransportError),

    /// The channel closed before a terminal reply arrived.
    #[error("native host disconnected before replying{}", reason_suffix(.reason))]
    Disconnected { reason: Option<String> },

    /// No terminal reply within the configured timeout.
    #[error("no reply from native host within {0:?}")]
    Timeout(std::time::Duration),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
}

impl Error {
    /// Tag callers can branch on: the helper's own tag for [`Error::Bloss`],
    /// `"disconnected"` and `"timeout"` for the bridge's own outcomes.
    pub fn kind(&self) -> &str {
        match self {
            Error::Bloss(e) => &e.kind,
            Error::Decode(_) | Error::UnexpectedReply { .. } => "decode",
            Error::Transport(_) => "transport",
            Error::Disconnected { .. } => "disconnected",
            Error::Timeout(_) => "timeout",
        }
    }

    /// Details attached by the helper, if this is a protocol error.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Bloss(e) => Some(&e.details),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Disconnected(reason) => Error::Disconnected { reason },
            other => Error::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
