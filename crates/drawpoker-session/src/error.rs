//! Error types for the session layer.

use drawpoker_transport::ConnectionId;

/// Errors that can occur while registering a connection.
///
/// None of these close the connection: the handler answers with an info
/// message and the client may try again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Another live connection already uses this nickname.
    #[error("nickname {0:?} is already in use")]
    NicknameTaken(String),

    /// The nickname is empty, too long, or contains control characters.
    #[error("invalid nickname: {0}")]
    InvalidNickname(String),

    /// This connection already said hello.
    #[error("{0} is already registered as {1:?}")]
    AlreadyRegistered(ConnectionId, String),
}
