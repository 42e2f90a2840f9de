//! Decoding of the `{"Ok": ...} | {"Error": ...}` reply envelope.
//!
//! Every reply from the helper is wrapped in exactly one of the two keys. The
//! `Error` side is an ad hoc tagged union: either a bare string (`"IncorrectPin"`)
//! or an object with a single key whose value carries details
//! (`{"CardNotFound": {"aid": "..."}}`). Both shapes are normalized into
//! [`BlossError`]; anything else is a [`DecodeError`].
//!
//! ```rust
//! use bloss_bridge::envelope::{Reply, BlossError};
//! use serde_json::json;
//!
//! let reply = Reply::decode(json!({"Error": {"Bar": {"x": 1}}})).unwrap();
//! assert_eq!(reply, Reply::Error(BlossError::new("Bar", json!({"x": 1}))));
//!
//! let reply = Reply::decode(json!({"Ok": "AwaitTouch"})).unwrap();
//! assert_eq!(reply, Reply::AwaitTouch);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::card::CardInfo;

/// A protocol-level failure reported by the helper.
///
/// `kind` is the helper's tag, passed through verbatim. `details` is `Null` when
/// the helper sent a bare tag.
#[derive(Serialize, Deserialize, Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct BlossError {
    pub kind: String,
    pub details: Value,
}

impl BlossError {
    pub fn new(kind: impl Into<String>, details: Value) -> Self {
        Self {
            kind: kind.into(),
            details,
        }
    }

    /// An error with a tag and no details.
    pub fn tag(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// Re-encode into the helper's wire shape.
    pub fn to_wire(&self) -> Value {
        if self.details.is_null() {
            Value::String(self.kind.clone())
        } else {
            let mut map = Map::with_capacity(1);
            map.insert(self.kind.clone(), self.details.clone());
            Value::Object(map)
        }
    }
}

/// A reply that does not follow the envelope contract.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("reply is not a JSON object: {0}")]
    NotAnObject(Value),
    #[error("reply has neither an `Ok` nor an `Error` field: {0}")]
    MissingEnvelope(Value),
    #[error("error value must be a string or a single-key object, got {0}")]
    ErrorShape(Value),
    #[error("unrecognized `Ok` payload: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
    },
}

/// Parse the value found under `Error` into a [`BlossError`].
pub fn parse_error(value: Value) -> Result<BlossError, DecodeError> {
    match value {
        Value::String(kind) => Ok(BlossError::tag(kind)),
        Value::Object(map) => {
            let mut entries = map.into_iter();
            match (entries.next(), entries.next()) {
                (Some((kind, details)), None) => Ok(BlossError::new(kind, details)),
                (first, second) => {
                    let shape: Map<String, Value> =
                        first.into_iter().chain(second).chain(entries).collect();
                    Err(DecodeError::ErrorShape(Value::Object(shape)))
                }
            }
        }
        other => Err(DecodeError::ErrorShape(other)),
    }
}

/// Split a raw reply into its success payload or its decoded error.
///
/// `Ok` is checked first; when it is present `Error` is not looked at.
pub fn decode_envelope(reply: Value) -> Result<Result<Value, BlossError>, DecodeError> {
    let mut map = match reply {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(other)),
    };
    if let Some(ok) = map.remove("Ok") {
        return Ok(Ok(ok));
    }
    match map.remove("Error") {
        Some(err) => parse_error(err).map(Err),
        None => Err(DecodeError::MissingEnvelope(Value::Object(map))),
    }
}

/// Success payloads the helper can send.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Payload {
    ListCards(Vec<CardInfo>),
    SignMessage(Vec<u8>),
    AwaitTouch,
}

/// A fully decoded reply. Nothing past this type sees raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Cards(Vec<CardInfo>),
    AwaitTouch,
    Signature(Vec<u8>),
    Error(BlossError),
}

impl Reply {
    pub fn decode(raw: Value) -> Result<Self, DecodeError> {
        match decode_envelope(raw)? {
            Ok(payload) => {
                let payload: Payload = serde_json::from_value(payload)
                    .map_err(|source| DecodeError::Payload { source })?;
                Ok(payload.into())
            }
            Err(err) => Ok(Reply::Error(err)),
        }
    }

    /// Encode the reply the way a helper would put it on the wire.
    pub fn to_wire(&self) -> Value {
        match self {
            Reply::Cards(cards) => json!({ "Ok": { "ListCards": cards } }),
            Reply::AwaitTouch => json!({ "Ok": "AwaitTouch" }),
            Reply::Signature(sig) => json!({ "Ok": { "SignMessage": sig } }),
            Reply::Error(err) => json!({ "Error": err.to_wire() }),
        }
    }

    /// Wire name of the variant, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Reply::Cards(_) => "ListCards",
            Reply::AwaitTouch => "AwaitTouch",
            Reply::Signature(_) => "SignMessage",
            Reply::Error(_) => "Error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Reply::AwaitTouch)
    }
}

impl From<Payload> for Reply {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::ListCards(cards) => Reply::Cards(cards),
            Payload::SignMessage(sig) => Reply::Signature(sig),
            Payload::AwaitTouch => Reply::AwaitTouch,
        }
    }
}
