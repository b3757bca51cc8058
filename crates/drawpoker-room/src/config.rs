//! Room configuration.

use drawpoker_cards::DECK_SIZE;
use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Most seats one deck can deal a five-card hand to.
pub const MAX_SEATS: usize = DECK_SIZE / 5;

/// Configuration for the game room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Seated players needed before a round starts.
    pub min_players: usize,

    /// Maximum seated players. The default is as many five-card hands as
    /// one deck holds.
    pub max_players: usize,
}

impl RoomConfig {
    /// Checks `1 <= min_players <= max_players <= MAX_SEATS`.
    ///
    /// # Errors
    /// [`RoomError::InvalidConfig`] when the seat range is empty or a full
    /// table could not be dealt from one deck.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.min_players == 0
            || self.min_players > self.max_players
            || self.max_players > MAX_SEATS
        {
            return Err(RoomError::InvalidConfig {
                min_players: self.min_players,
                max_players: self.max_players,
            });
        }
        Ok(())
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: MAX_SEATS,
        }
    }
}
