//! The five-card draw room.
//!
//! One [`GameRoom`] lives for the whole process. It owns the roster, the
//! round's hands and deck, and the phase machine:
//!
//! ```text
//! Waiting ──(2nd player joins)──→ Draw ──(everyone drew)──→ Showdown
//!    ↑                              │                         │
//!    └──(fewer than 2 players)──────┘←────(immediately)───────┘
//! ```
//!
//! The room does no I/O. Every operation returns the messages it produced
//! as `(Recipient, ServerMessage)` pairs and the server delivers them.
//!
//! # Key types
//!
//! - [`GameRoom`]: the state machine
//! - [`RoomConfig`]: player limits
//! - [`Outbox`]: messages produced by one operation

mod config;
mod error;
mod room;

pub use config::{RoomConfig, MAX_SEATS};
pub use error::RoomError;
pub use room::{GameRoom, Outbox};
