mod list;
mod sign;

use std::{io, time::Duration};

use crate::config::BridgeConfig;
use crate::transport::{ProcessTransport, Transport};

/// Typed front end to the helper.
///
/// Every call opens its own channel, so one client can be shared freely between
/// concurrent tasks. Nothing is retried; a failed call must be re-issued.
#[derive(Debug)]
pub struct BlossClient<T> {
    transport: T,
    request_timeout: Option<Duration>,
    sign_timeout: Option<Duration>,
}

impl<T: Transport> BlossClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            request_timeout: None,
            sign_timeout: None,
        }
    }

    /// Give up on one-shot requests after `limit`.
    pub fn with_request_timeout(mut self, limit: Duration) -> Self {
        self.request_timeout = Some(limit);
        self
    }

    /// Give up on a signing session after `limit`, touch wait included.
    pub fn with_sign_timeout(mut self, limit: Duration) -> Self {
        self.sign_timeout = Some(limit);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl BlossClient<ProcessTransport> {
    /// Client that launches the helper described by `config`.
    pub fn from_config(config: &BridgeConfig) -> io::Result<Self> {
        let transport = ProcessTransport::from_config(config)?;
        Ok(Self {
            transport,
            request_timeout: config.request_timeout(),
            sign_timeout: config.sign_timeout(),
        })
    }
}
