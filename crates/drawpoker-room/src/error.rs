//! Error types for the room layer.

use drawpoker_cards::CardError;

use crate::config::MAX_SEATS;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The table already seats the maximum number of players.
    #[error("the table is full ({0} players)")]
    Full(usize),

    /// A [`RoomConfig`](crate::RoomConfig) whose seat range is empty or
    /// larger than one deck can deal.
    #[error(
        "invalid seat range {min_players}..={max_players} (must lie within 1..={})",
        MAX_SEATS
    )]
    InvalidConfig {
        min_players: usize,
        max_players: usize,
    },

    /// Dealing failed. Only reachable with a config that skipped
    /// [`RoomConfig::validate`](crate::RoomConfig::validate).
    #[error(transparent)]
    Cards(#[from] CardError),
}
