//! Outbound messages understood by the helper.
//!
//! ```rust
//! use bloss_bridge::command::{Command, Request, SignRequest};
//! use serde_json::json;
//!
//! let list = serde_json::to_value(Request::new(Command::ListCards)).unwrap();
//! assert_eq!(list, json!({"command": "ListCards"}));
//!
//! let sign = Request::new(Command::SignMessage(SignRequest::new("D276", b"hi", b"123456")));
//! assert_eq!(
//!     serde_json::to_value(&sign).unwrap(),
//!     json!({"command": {"SignMessage": {"aid": "D276", "message": [104, 105], "pin": [49, 50, 51, 52, 53, 54]}}}),
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Top-level request object: `{"command": ...}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Request {
    pub command: Command,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Self { command }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub enum Command {
    ListCards,
    SignMessage(SignRequest),
}

/// Arguments of a signing request.
///
/// The PIN is wiped from memory when the request is dropped and never shows up
/// in `Debug` output.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SignRequest {
    pub aid: String,
    pub message: Vec<u8>,
    pin: Vec<u8>,
}

impl SignRequest {
    pub fn new(aid: &str, message: &[u8], pin: &[u8]) -> Self {
        Self {
            aid: aid.to_owned(),
            message: message.to_vec(),
            pin: pin.to_vec(),
        }
    }

    pub fn pin(&self) -> &[u8] {
        &self.pin
    }
}

impl fmt::Debug for SignRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignRequest")
            .field("aid", &self.aid)
            .field("message_len", &self.message.len())
            .field("pin", &"<redacted>")
            .finish()
    }
}
