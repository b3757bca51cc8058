//! Process-level configuration read from the environment.

use std::str::FromStr;

use drawpoker_room::RoomConfig;
use drawpoker_session::SessionConfig;

use crate::DrawPokerError;

const ADDR_ENV: &str = "DRAWPOKER_ADDR";
const MAX_PLAYERS_ENV: &str = "DRAWPOKER_MAX_PLAYERS";
const OUTBOUND_QUEUE_ENV: &str = "DRAWPOKER_OUTBOUND_QUEUE";

/// Everything the binary needs to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address. Default: `0.0.0.0:5000`.
    pub bind_addr: String,
    pub room: RoomConfig,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".into(),
            room: RoomConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `DRAWPOKER_ADDR`, `DRAWPOKER_MAX_PLAYERS`
    /// and `DRAWPOKER_OUTBOUND_QUEUE` where set.
    pub fn from_env() -> Result<Self, DrawPokerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DrawPokerError> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ADDR_ENV) {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup(MAX_PLAYERS_ENV) {
            config.room.max_players = parse(MAX_PLAYERS_ENV, &raw)?;
        }
        if let Some(raw) = lookup(OUTBOUND_QUEUE_ENV) {
            config.session.outbound_queue = parse(OUTBOUND_QUEUE_ENV, &raw)?;
        }

        config.room.validate()?;
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, DrawPokerError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| DrawPokerError::Config(format!("{key}={raw:?}: {e}")))
}
