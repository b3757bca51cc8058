//! Unified error type for the drawpoker server.

use drawpoker_room::RoomError;
use drawpoker_transport::TransportError;

/// Top-level error for startup and connection handling.
///
/// The `#[from]` attribute on each variant generates `From` impls, so `?`
/// converts sub-crate errors automatically. Codec, registration and room
/// rule failures during play are answered on the connection instead of
/// surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum DrawPokerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An invalid room configuration.
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
