//! Error types for the card layer.

/// Errors that can occur while parsing cards or dealing from a deck.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardError {
    /// The text is not a 2-character card token like `"AS"` or `"TD"`.
    #[error("invalid card token: {0:?}")]
    InvalidToken(String),

    /// A deal asked for more cards than the deck holds.
    #[error("deck exhausted: wanted {wanted} cards, {remaining} remaining")]
    DeckExhausted { wanted: usize, remaining: usize },
}
