//! The game room: roster, round lifecycle, draws and showdown.
//!
//! `GameRoom` is a plain struct with no interior locking. The server keeps
//! exactly one behind a mutex, so every operation here runs to completion
//! before the next one starts and observers never see a half-updated
//! phase/hands/drawn combination.

use std::collections::{BTreeSet, HashSet};

use drawpoker_cards::{best_hand, Deck, Hand};
use drawpoker_protocol::{Phase, Recipient, Reveal, ServerMessage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{RoomConfig, RoomError};

/// Messages produced by one room operation, in delivery order.
pub type Outbox = Vec<(Recipient, ServerMessage)>;

/// Most cards a player may exchange in one draw.
const MAX_DRAW: usize = 3;

/// The single shared poker table.
pub struct GameRoom {
    config: RoomConfig,
    phase: Phase,

    /// Seated players in join order.
    players: Vec<String>,

    /// This round's hands, in deal order. Only players seated when the
    /// round started hold one.
    hands: Vec<(String, Hand)>,

    /// Players who already exchanged cards this round.
    drawn: HashSet<String>,

    deck: Deck,

    /// Rounds started so far.
    round: u64,

    rng: StdRng,
}

impl GameRoom {
    /// Creates an empty room shuffling from OS entropy.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty room with a reproducible shuffle sequence.
    pub fn with_seed(config: RoomConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RoomConfig, rng: StdRng) -> Self {
        Self {
            config,
            phase: Phase::Waiting,
            players: Vec::new(),
            hands: Vec::new(),
            drawn: HashSet::new(),
            deck: Deck::empty(),
            round: 0,
            rng,
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seated players in join order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// The player's hand this round, if they were dealt in.
    pub fn hand(&self, nick: &str) -> Option<&Hand> {
        self.hands.iter().find(|(n, _)| n == nick).map(|(_, h)| h)
    }

    /// Cards left in the deck.
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn has_drawn(&self, nick: &str) -> bool {
        self.drawn.contains(nick)
    }

    /// The `game_state` snapshot broadcast after every roster or phase
    /// change.
    pub fn state_message(&self) -> ServerMessage {
        ServerMessage::GameState {
            phase: self.phase,
            players: self.players.clone(),
            round: self.round,
        }
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Seats a player, starting a round if enough players are waiting.
    ///
    /// Joining again is harmless: a seated player's repeat join in
    /// `Waiting` only re-runs the start check, which is how the next round
    /// begins after a showdown. Players joining mid-round are dealt in at
    /// the next round.
    ///
    /// # Errors
    /// - [`RoomError::Full`]: the table is at `max_players`
    /// - [`RoomError::Cards`]: the deck cannot serve every seat. A player
    ///   seated by this call is unseated again.
    pub fn join(&mut self, nick: &str) -> Result<Outbox, RoomError> {
        let mut out = Outbox::new();

        let newcomer = !self.players.iter().any(|p| p == nick);
        if newcomer {
            if self.players.len() >= self.config.max_players {
                return Err(RoomError::Full(self.config.max_players));
            }
            self.players.push(nick.to_string());
            tracing::info!(nick, players = self.players.len(), "player seated");
            out.push((Recipient::All, ServerMessage::info(format!("{nick} joined the table."))));

            if self.phase != Phase::Waiting {
                out.push((
                    Recipient::Player(nick.to_string()),
                    ServerMessage::info("A round is in progress. You will be dealt in next round."),
                ));
            }
        }

        if self.phase == Phase::Waiting && self.players.len() >= self.config.min_players {
            if let Err(e) = self.start_round(&mut out) {
                if newcomer {
                    self.players.pop();
                }
                tracing::warn!(nick, error = %e, "could not deal a round");
                return Err(e);
            }
        }

        out.push((Recipient::All, self.state_message()));
        Ok(out)
    }

    /// Removes a player from the table.
    ///
    /// If the round can no longer be played (fewer than `min_players`
    /// hands left) it is aborted and the room returns to `Waiting`. If the
    /// leaver was the last player still to draw, the showdown runs now.
    /// Nicknames not seated produce no output.
    pub fn leave(&mut self, nick: &str) -> Outbox {
        let Some(pos) = self.players.iter().position(|p| p == nick) else {
            return Outbox::new();
        };
        self.players.remove(pos);
        self.hands.retain(|(n, _)| n != nick);
        self.drawn.remove(nick);
        tracing::info!(nick, players = self.players.len(), "player left the table");

        let mut out = Outbox::new();
        if self.phase == Phase::Draw {
            if self.hands.len() < self.config.min_players {
                tracing::info!(round = self.round, "round aborted");
                out.push((
                    Recipient::All,
                    ServerMessage::info(format!(
                        "Round {} aborted: not enough players.",
                        self.round
                    )),
                ));
                self.reset();
            } else if self.everyone_drew() {
                self.showdown(&mut out);
                return out;
            }
        }

        out.push((Recipient::All, self.state_message()));
        out
    }

    /// Exchanges the cards at `indices` in the player's hand.
    ///
    /// Indices outside `0..5` and duplicates are dropped and at most three
    /// slots (lowest first) are replaced. A slot is left alone once the
    /// deck runs dry. Ignored outside the draw phase and for players not
    /// dealt into the round.
    ///
    /// The broadcast "changed N card(s)" counts cards actually replaced,
    /// not the indices the client sent.
    pub fn draw(&mut self, nick: &str, indices: &[i64]) -> Outbox {
        if self.phase != Phase::Draw {
            tracing::debug!(nick, phase = %self.phase, "draw outside draw phase ignored");
            return Outbox::new();
        }
        let Some(slot) = self.hands.iter().position(|(n, _)| n == nick) else {
            tracing::debug!(nick, "draw from player without a hand ignored");
            return Outbox::new();
        };
        if self.drawn.contains(nick) {
            return vec![(
                Recipient::Player(nick.to_string()),
                ServerMessage::info("You have already drawn this round."),
            )];
        }

        let positions: BTreeSet<usize> = indices
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter(|&i| i < 5)
            .collect();

        let mut replaced = 0;
        let hand = &mut self.hands[slot].1;
        for i in positions.into_iter().take(MAX_DRAW) {
            let Some(card) = self.deck.draw() else {
                break;
            };
            hand[i] = card;
            replaced += 1;
        }
        let cards = *hand;
        self.drawn.insert(nick.to_string());
        tracing::debug!(nick, replaced, "player drew");

        let mut out = vec![
            (
                Recipient::Player(nick.to_string()),
                ServerMessage::Hand {
                    cards,
                    can_draw: false,
                },
            ),
            (
                Recipient::All,
                ServerMessage::info(format!("{nick} changed {replaced} card(s).")),
            ),
        ];

        if self.everyone_drew() {
            self.showdown(&mut out);
        }
        out
    }

    // -----------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------

    fn start_round(&mut self, out: &mut Outbox) -> Result<(), RoomError> {
        let mut deck = Deck::new();
        deck.shuffle(&mut self.rng);
        let hands = self
            .players
            .iter()
            .map(|nick| Ok((nick.clone(), deck.deal_hand()?)))
            .collect::<Result<Vec<_>, RoomError>>()?;

        self.round += 1;
        self.phase = Phase::Draw;
        self.deck = deck;
        self.hands = hands;
        self.drawn.clear();
        tracing::info!(round = self.round, players = self.hands.len(), "round started");

        for (nick, cards) in &self.hands {
            out.push((
                Recipient::Player(nick.clone()),
                ServerMessage::Hand {
                    cards: *cards,
                    can_draw: true,
                },
            ));
        }
        out.push((
            Recipient::All,
            ServerMessage::info(format!(
                "Round {} started. Every player holds 5 cards.",
                self.round
            )),
        ));
        Ok(())
    }

    fn everyone_drew(&self) -> bool {
        !self.hands.is_empty() && self.hands.iter().all(|(n, _)| self.drawn.contains(n))
    }

    /// Reveals every hand, announces the winners, then resets to
    /// `Waiting`. Pushes the closing `game_state` itself.
    fn showdown(&mut self, out: &mut Outbox) {
        self.phase = Phase::Showdown;

        if let Some(verdict) = best_hand(&self.hands) {
            tracing::info!(
                round = self.round,
                winners = ?verdict.winners,
                category = verdict.description(),
                "showdown"
            );
            out.push((
                Recipient::All,
                ServerMessage::info(format!("Round {} ended. Hands revealed.", self.round)),
            ));
            out.push((
                Recipient::All,
                ServerMessage::Showdown {
                    description: verdict.description().to_string(),
                    winners: verdict.winners,
                    hands: Reveal(self.hands.clone()),
                },
            ));
        }
        out.push((Recipient::All, self.state_message()));
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::Waiting;
        self.deck.clear();
        self.hands.clear();
        self.drawn.clear();
    }
}
