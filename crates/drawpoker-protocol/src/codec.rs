//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" converts between Rust types and the bytes of one wire line.
//! The server only depends on the [`Codec`] trait, so the format can be
//! swapped without touching the session handler.
//!
//! The line framing itself (the trailing `\n`) belongs to the transport.
//! A codec must therefore never emit a raw newline inside a frame.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec is shared by every connection
/// task through the server state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a single frame (no trailing newline).
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type (unknown `type` tag, missing fields, ...).
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output escapes newlines inside strings, so every encoded value
/// fits on one line.
///
/// ## Example
///
/// ```rust
/// use drawpoker_protocol::{Codec, JsonCodec, ClientMessage, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let msg: ClientMessage = codec.decode(br#"{"type":"join_game"}"#).unwrap();
/// assert_eq!(msg, ClientMessage::JoinGame);
///
/// let bytes = codec.encode(&ServerMessage::info("hi")).unwrap();
/// assert_eq!(bytes, br#"{"type":"info","text":"hi"}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, Phase, ServerMessage};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let msg = ServerMessage::GameState {
            phase: Phase::Waiting,
            players: vec!["ana".into()],
            round: 0,
        };
        let bytes = codec.encode(&msg).unwrap();
        let decoded: ServerMessage = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let codec = JsonCodec;
        let result: Result<ClientMessage, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_tolerates_trailing_whitespace() {
        // A client on Windows may send `\r\n`; the transport strips `\n`
        // only, and serde_json skips the trailing `\r`.
        let codec = JsonCodec;
        let msg: ClientMessage = codec.decode(b"{\"type\":\"join_game\"}\r").unwrap();
        assert_eq!(msg, ClientMessage::JoinGame);
    }
}
