//! Cards, deck, and hand evaluation for drawpoker.
//!
//! This crate is pure: no I/O, no locks. Everything above it (room, server)
//! builds on three pieces:
//!
//! - **Card model** ([`Card`], [`Rank`], [`Suit`], [`Hand`]): the 2-character
//!   wire token (`"AS"`, `"TD"`) is the canonical text form.
//! - **Deck** ([`Deck`]): a 52-card deck consumed from the tail.
//! - **Evaluation** ([`rank`], [`best_hand`]): five-card poker ranking with
//!   tie-break vectors and multi-way ties.

mod card;
mod deck;
mod error;
mod eval;

pub use card::{Card, Hand, Rank, Suit};
pub use deck::{Deck, DECK_SIZE};
pub use error::CardError;
pub use eval::{best_hand, rank, Category, HandRank, Verdict};
