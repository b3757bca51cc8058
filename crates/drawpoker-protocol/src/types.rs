//! Core protocol types for drawpoker's wire format.
//!
//! Every line on the wire is one JSON object with a `"type"` field naming
//! the message kind. Client and server speak different message sets, so
//! there are two enums: [`ClientMessage`] (inbound) and [`ServerMessage`]
//! (outbound).

use std::fmt;

use drawpoker_cards::Hand;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server message.
///
/// Room operations return a list of `(Recipient, ServerMessage)` pairs and
/// the server delivers each one. Players are addressed by nickname, which
/// the connection registry keeps unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every identified connection.
    All,

    /// The connection registered under this nickname.
    Player(String),
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The room-level round phase.
///
/// ```text
/// Waiting ──(2nd player joins)──→ Draw ──(everyone drew)──→ Showdown
///    ↑                                                        │
///    └──────────────────(immediately)─────────────────────────┘
/// ```
///
/// Any phase drops back to `Waiting` when fewer than two players remain.
/// On the wire the phase is its lowercase name: `"waiting"`, `"draw"`,
/// `"showdown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Draw,
    Showdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Draw => write!(f, "draw"),
            Self::Showdown => write!(f, "showdown"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: client → server
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` gives the internally
/// tagged shape the clients already use:
///   `{"type": "hello", "nick": "ana"}`
///   `{"type": "join_game"}`
///
/// Unknown `type` values, missing fields, and wrong field types all fail
/// to decode; the session handler drops such lines without replying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Identify this connection. Must come before anything else.
    Hello { nick: String },

    /// Say something to everyone connected.
    Chat {
        #[serde(default)]
        msg: String,
    },

    /// Take a seat at the table.
    JoinGame,

    /// Exchange cards. `cards` holds hand slot indices (0..5); out-of-range
    /// and duplicate indices are dropped and at most three are honoured.
    ///
    /// Any JSON number decodes. Numbers that cannot name a slot (fractions,
    /// values beyond `i64`) become [`NO_SLOT`] so the rest of the list
    /// still counts.
    Draw {
        #[serde(default, deserialize_with = "slot_indices")]
        cards: Vec<i64>,
    },
}

/// Stand-in for a draw index that cannot name any hand slot.
pub const NO_SLOT: i64 = -1;

fn slot_indices<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    let raw = Vec::<SlotIndex>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|SlotIndex(i)| i).collect())
}

/// One element of a `draw` list.
struct SlotIndex(i64);

impl<'de> Deserialize<'de> for SlotIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SlotVisitor;

        impl Visitor<'_> for SlotVisitor {
            type Value = SlotIndex;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a card slot number")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<SlotIndex, E> {
                Ok(SlotIndex(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<SlotIndex, E> {
                Ok(SlotIndex(i64::try_from(v).unwrap_or(NO_SLOT)))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<SlotIndex, E> {
                // `1.0` still names slot 1.
                let slot = if v.fract() == 0.0 && (0.0..5.0).contains(&v) {
                    v as i64
                } else {
                    NO_SLOT
                };
                Ok(SlotIndex(slot))
            }
        }

        deserializer.deserialize_any(SlotVisitor)
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Free-form notice ("ana connected", "round 3 started", ...).
    Info { text: String },

    /// A chat line relayed to everyone, tagged with the sender's nickname.
    Chat { from: String, msg: String },

    /// The recipient's private hand. Only ever unicast.
    Hand { cards: Hand, can_draw: bool },

    /// Room snapshot: phase, seated players in join order, round counter.
    GameState {
        phase: Phase,
        players: Vec<String>,
        round: u64,
    },

    /// End of round: winners, winning category name, and every hand.
    Showdown {
        winners: Vec<String>,
        description: String,
        hands: Reveal,
    },
}

impl ServerMessage {
    /// Shorthand for an [`ServerMessage::Info`] notice.
    pub fn info(text: impl Into<String>) -> Self {
        Self::Info { text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Reveal: ordered nickname → hand map
// ---------------------------------------------------------------------------

/// All hands shown at showdown, in deal order.
///
/// On the wire this is a JSON object (`{"ana": ["AS", ...], "bo": [...]}`).
/// A `HashMap` would lose the deal order, so it is stored as a list of
/// pairs and (de)serialized as a map by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reveal(pub Vec<(String, Hand)>);

impl Reveal {
    /// Looks up one player's hand.
    pub fn get(&self, nick: &str) -> Option<&Hand> {
        self.0.iter().find(|(n, _)| n == nick).map(|(_, h)| h)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Reveal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (nick, hand) in &self.0 {
            map.serialize_entry(nick, hand)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Reveal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RevealVisitor;

        impl<'de> Visitor<'de> for RevealVisitor {
            type Value = Reveal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of nickname to five card tokens")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Reveal, A::Error> {
                let mut hands = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((nick, hand)) = access.next_entry::<String, Hand>()? {
                    hands.push((nick, hand));
                }
                Ok(Reveal(hands))
            }
        }

        deserializer.deserialize_map(RevealVisitor)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The clients parse exact JSON shapes, so these tests pin the serde
    //! attributes down field by field.

    use drawpoker_cards::Card;

    use super::*;

    fn hand(tokens: [&str; 5]) -> Hand {
        tokens.map(|t| t.parse::<Card>().unwrap())
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_decode_hello() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"hello","nick":"ana"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Hello { nick: "ana".into() });
    }

    #[test]
    fn test_decode_chat() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"chat","msg":"hola"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Chat { msg: "hola".into() });
    }

    #[test]
    fn test_decode_join_game_without_fields() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"join_game"}"#).unwrap();
        assert_eq!(msg, ClientMessage::JoinGame);
    }

    #[test]
    fn test_decode_draw_keeps_raw_indices() {
        // Filtering happens in the room, not here: negative and large
        // indices must survive decoding.
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"draw","cards":[0,4,-1,9]}"#).unwrap();
        assert_eq!(msg, ClientMessage::Draw { cards: vec![0, 4, -1, 9] });
    }

    #[test]
    fn test_decode_draw_keeps_indices_around_huge_numbers() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"draw","cards":[0,1e30,99999999999999999999,18446744073709551615,2]}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Draw {
                cards: vec![0, NO_SLOT, NO_SLOT, NO_SLOT, 2]
            }
        );
    }

    #[test]
    fn test_decode_draw_fractions_name_no_slot() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"draw","cards":[1.0,2.5,-0.5,4]}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Draw {
                cards: vec![1, NO_SLOT, NO_SLOT, 4]
            }
        );
    }

    #[test]
    fn test_decode_draw_without_cards_is_empty() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"draw"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Draw { cards: vec![] });
    }

    #[test]
    fn test_decode_unknown_type_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"bet","amount":100}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_hello_without_nick_returns_error() {
        let result: Result<ClientMessage, _> = serde_json::from_str(r#"{"type":"hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_draw_with_non_integer_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"draw","cards":["AS"]}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerMessage: one test per variant to verify JSON shape
    // =====================================================================

    #[test]
    fn test_info_json_format() {
        let json = serde_json::to_string(&ServerMessage::info("ana connected")).unwrap();
        assert_eq!(json, r#"{"type":"info","text":"ana connected"}"#);
    }

    #[test]
    fn test_chat_json_format() {
        let msg = ServerMessage::Chat {
            from: "ana".into(),
            msg: "hi".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"chat","from":"ana","msg":"hi"}"#);
    }

    #[test]
    fn test_hand_json_format() {
        let msg = ServerMessage::Hand {
            cards: hand(["AS", "KD", "2C", "TH", "9S"]),
            can_draw: true,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"hand","cards":["AS","KD","2C","TH","9S"],"can_draw":true}"#
        );
    }

    #[test]
    fn test_game_state_json_format() {
        let msg = ServerMessage::GameState {
            phase: Phase::Draw,
            players: vec!["ana".into(), "bo".into()],
            round: 3,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"game_state","phase":"draw","players":["ana","bo"],"round":3}"#
        );
    }

    #[test]
    fn test_showdown_hands_keep_deal_order() {
        let msg = ServerMessage::Showdown {
            winners: vec!["zed".into()],
            description: "Pair".into(),
            hands: Reveal(vec![
                ("zed".into(), hand(["AS", "AD", "2C", "3H", "4S"])),
                ("amy".into(), hand(["KS", "QD", "9C", "7H", "5S"])),
            ]),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"showdown","winners":["zed"],"description":"Pair","hands":{"zed":["AS","AD","2C","3H","4S"],"amy":["KS","QD","9C","7H","5S"]}}"#
        );

        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_reveal_get() {
        let reveal = Reveal(vec![("bo".into(), hand(["AS", "AD", "2C", "3H", "4S"]))]);
        assert!(reveal.get("bo").is_some());
        assert!(reveal.get("ana").is_none());
        assert_eq!(reveal.len(), 1);
    }

    #[test]
    fn test_phase_display_matches_wire() {
        for phase in [Phase::Waiting, Phase::Draw, Phase::Showdown] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
        assert_eq!(Phase::default(), Phase::Waiting);
    }

    #[test]
    fn test_encoded_messages_never_contain_newlines() {
        // A newline inside a chat message must stay escaped, or it would
        // split the frame in two.
        let msg = ServerMessage::Chat {
            from: "ana".into(),
            msg: "line one\nline two".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains('\n'));
    }
}
