//! Wire protocol for drawpoker.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Phase`],
//!   [`Reveal`]): the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how one message becomes
//!   the bytes of one line and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and the room /
//! session layers. It doesn't know about sockets or game rules.
//!
//! ```text
//! Transport (lines) → Protocol (ClientMessage) → Session handler → Room
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, Phase, Recipient, Reveal, ServerMessage, NO_SLOT};
