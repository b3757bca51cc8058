//! The card model: ranks, suits, cards, and their 2-character tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CardError;

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// A card rank. The discriminant is the numeric value used for scoring,
/// so Ace is 14 and `Rank::Ace as u8` is the high-ace value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// All ranks from lowest to highest.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric value in 2..=14.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// The rank character used in card tokens.
    pub fn symbol(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Rank::ALL.into_iter().find(|r| r.symbol() == c)
    }
}

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// A card suit. Suits never affect ranking order, only flush detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    /// All suits, in deck-building order.
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    /// The suit character used in card tokens.
    pub fn symbol(self) -> char {
        match self {
            Suit::Club => 'C',
            Suit::Diamond => 'D',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Suit::ALL.into_iter().find(|s| s.symbol() == c)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single playing card.
///
/// On the wire a card is its token string: rank character followed by suit
/// character (`"AS"` is the ace of spades, `"TD"` the ten of diamonds).
/// `#[serde(try_from, into)]` routes serde through the `String` conversions
/// below, so a malformed token fails deserialization instead of producing a
/// bogus card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// A dealt hand. Always exactly five cards.
pub type Hand = [Card; 5];

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardError::InvalidToken(s.to_string()));
        };
        match (Rank::from_symbol(r), Suit::from_symbol(su)) {
            (Some(rank), Some(suit)) => Ok(Card { rank, suit }),
            _ => Err(CardError::InvalidToken(s.to_string())),
        }
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}
