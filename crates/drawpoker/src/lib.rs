//! # drawpoker
//!
//! A multiplayer five-card draw poker server. Clients connect over plain
//! TCP and exchange one JSON object per line; everyone connected shares a
//! single table.
//!
//! The crate ties the layers together: transport → protocol → session →
//! room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drawpoker::prelude::*;
//!
//! # async fn start() -> Result<(), DrawPokerError> {
//! let server = DrawPokerServer::builder()
//!     .bind("0.0.0.0:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::DrawPokerError;
pub use server::{DrawPokerServer, DrawPokerServerBuilder};

pub use drawpoker_cards as cards;
pub use drawpoker_protocol as protocol;
pub use drawpoker_room::RoomConfig;
pub use drawpoker_session::SessionConfig;

pub mod prelude {
    pub use crate::{DrawPokerError, DrawPokerServer, RoomConfig, ServerConfig, SessionConfig};
}
