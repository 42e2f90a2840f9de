use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing algorithm of the key held in a card's signature slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    #[serde(rename = "ed25519", alias = "Ed25519")]
    Ed25519,
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningAlgorithm::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// An OpenPGP card as reported by the helper.
///
/// `aid` is the stable handle used to address the card in later calls such as
/// [`BlossClient::sign_message`](crate::BlossClient::sign_message). The public key
/// is kept as raw bytes; its layout is defined by `signing_algo`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    pub manufacturer: String,
    pub serial_number: String,
    pub aid: String,
    pub signing_algo: SigningAlgorithm,
    #[serde(rename = "pubkeyBytes", alias = "publicKey")]
    pub public_key: Vec<u8>,
}
