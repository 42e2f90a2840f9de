//! # bloss_bridge
//!
//! A typed async bridge to the **Bloss native helper**, the locally installed
//! process that owns PC/SC access to OpenPGP cards and does the actual Ed25519
//! signing:
//!
//! - **List cards** with a single request/reply round trip
//! - **Sign a message** over a persistent channel that may pause for a
//!   physical **touch confirmation** before returning the signature
//! - Launch the helper the way a browser would, from its **native messaging
//!   host manifest**, or drive everything in-process for tests
//!
//! ---
//!
//! ## The wire protocol
//!
//! The helper speaks browser native messaging over its stdin/stdout:
//!
//! 1. A **4-byte length prefix** (`u32`) in **native endianness**.
//! 2. That many bytes of UTF-8 JSON.
//!
//! Requests look like `{"command": "ListCards"}` or
//! `{"command": {"SignMessage": {"aid": "...", "message": [..], "pin": [..]}}}`.
//! Byte sequences travel as JSON arrays of integers 0–255.
//!
//! Every reply is wrapped in an envelope, `{"Ok": ...}` or `{"Error": ...}`:
//!
//! | Reply                               | Meaning                                  |
//! |-------------------------------------|------------------------------------------|
//! | `{"Ok": {"ListCards": [...]}}`      | the cards, in the helper's order         |
//! | `{"Ok": "AwaitTouch"}`              | signing is waiting for a touch (interim) |
//! | `{"Ok": {"SignMessage": [...]}}`    | the signature (terminal)                 |
//! | `{"Error": "IncorrectPin"}`         | failure with a bare tag                  |
//! | `{"Error": {"CardNotFound": ...}}`  | failure with a tag and details           |
//!
//! The [`envelope`] module turns these into a closed [`Reply`](envelope::Reply)
//! enum at the boundary. Error tags are the helper's own and are passed through
//! untouched in [`BlossError::kind`].
//!
//! ---
//!
//! ## Crate layout
//!
//! - [`frame`]: length-prefixed framing, sync and async.
//! - [`envelope`]: reply decoding and [`BlossError`].
//! - [`card`], [`command`]: the typed payloads in each direction.
//! - [`transport`]: [`Port`](transport::Port) channels, the [`Transport`](transport::Transport)
//!   trait, [`ProcessTransport`](transport::ProcessTransport) and
//!   [`LoopbackTransport`](transport::LoopbackTransport).
//! - [`manifest`]: finding the helper through its installed host manifest.
//! - [`config`]: [`BridgeConfig`], loaded from TOML.
//! - [`BlossClient`]: `list_cards` and `sign_message`.
//!
//! ---
//!
//! ## Quick start
//!
//! ```no_run
//! use bloss_bridge::{BlossClient, BridgeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BlossClient::from_config(&BridgeConfig::default())?;
//!
//!     let cards = client.list_cards().await?;
//!     let card = cards.first().ok_or("no card inserted")?;
//!
//!     let signature = client
//!         .sign_message(&card.aid, b"hello", b"123456", || {
//!             eprintln!("touch your card to confirm");
//!         })
//!         .await?;
//!     println!("{} byte signature", signature.len());
//!     Ok(())
//! }
//! ```
//!
//! ### Branching on failures
//!
//! Every failure is surfaced as an [`Error`]; nothing is retried. UI code can
//! branch on [`Error::kind`], which is the helper's tag for protocol errors and
//! `"disconnected"` / `"timeout"` for outcomes the bridge detects itself:
//!
//! ```no_run
//! # use bloss_bridge::{BlossClient, transport::Transport};
//! # async fn sign<T: Transport>(client: &BlossClient<T>, aid: &str, pin: &[u8]) {
//! match client.sign_message(aid, b"msg", pin, || {}).await {
//!     Ok(sig) => println!("signed: {sig:?}"),
//!     Err(e) if e.kind() == "IncorrectPin" => eprintln!("wrong PIN"),
//!     Err(e) if e.kind() == "timeout" => eprintln!("no touch received"),
//!     Err(e) => eprintln!("signing failed: {e}"),
//! }
//! # }
//! ```
//!
//! ---
//!
//! ## Gotchas
//!
//! - **The PIN is sensitive.** It is held in a zeroizing buffer, redacted from
//!   `Debug`, and never logged. Outbound request bodies are never logged at all.
//! - **Touch can stall forever.** The helper waits for the user with no limit of
//!   its own. Configure [`BlossClient::with_sign_timeout`] (or `sign_timeout_secs`)
//!   if a stuck card must not hang the caller.
//! - **Concurrent signing is allowed here**, but the helper may serialize card
//!   access on its side.
//! - **One process per channel.** [`ProcessTransport`](transport::ProcessTransport)
//!   starts a fresh helper for every port and stops it when the port closes, as
//!   browsers do.

pub mod card;
pub mod client;
pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod manifest;
pub mod transport;

// -------- Re-exports --------

#[doc(inline)]
pub use card::{CardInfo, SigningAlgorithm};
#[doc(inline)]
pub use client::BlossClient;
#[doc(inline)]
pub use config::BridgeConfig;
#[doc(inline)]
pub use envelope::BlossError;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use frame::{decode_message, encode_message};
