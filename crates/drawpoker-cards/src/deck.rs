//! A standard 52-card deck, dealt from the tail.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Card, CardError, Hand, Rank, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// An ordered pile of unique cards.
///
/// `Deck::new()` is unshuffled; shuffling is the caller's job and must
/// happen once per round before the first deal. Cards come off the tail
/// (`Vec::pop`), so dealing never shifts the remaining cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds all 52 rank × suit combinations, suit-major.
    pub fn new() -> Self {
        let cards = Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
            .collect();
        Self { cards }
    }

    /// An empty deck. Rooms hold one of these between rounds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Uniform random permutation of the remaining cards.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns `n` cards from the tail.
    ///
    /// # Errors
    /// Returns [`CardError::DeckExhausted`] (and leaves the deck untouched)
    /// when fewer than `n` cards remain.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, CardError> {
        if n > self.cards.len() {
            return Err(CardError::DeckExhausted {
                wanted: n,
                remaining: self.cards.len(),
            });
        }
        let mut dealt = Vec::with_capacity(n);
        for _ in 0..n {
            // Length checked above, so every pop yields a card.
            if let Some(card) = self.cards.pop() {
                dealt.push(card);
            }
        }
        Ok(dealt)
    }

    /// Deals a five-card [`Hand`] from the tail.
    pub fn deal_hand(&mut self) -> Result<Hand, CardError> {
        let remaining = self.cards.len();
        let cards = self.deal(5)?;
        <Hand>::try_from(cards).map_err(|_| CardError::DeckExhausted {
            wanted: 5,
            remaining,
        })
    }

    /// Pops a single card, or `None` once the deck is empty.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Whether `card` is still in the deck.
    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }
}
