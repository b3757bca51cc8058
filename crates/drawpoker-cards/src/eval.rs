//! Five-card hand evaluation.
//!
//! [`rank`] maps a hand to a [`HandRank`]: a category plus a tie-break
//! vector. `HandRank` derives `Ord` with the category first and the vector
//! second, so comparing two ranks is exactly "higher category wins, then
//! compare tie-break values left to right". Two hands whose ranks are equal
//! split the pot (there is no pot, but they both win).

use std::cmp::Ordering;

use crate::Hand;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The nine hand categories, weakest first.
///
/// Declaration order matters: the derived `Ord` is what makes a flush beat
/// a straight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    /// Numeric category, 0 (high card) through 8 (straight flush).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Display name shown to players at showdown.
    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "High card",
            Category::OnePair => "Pair",
            Category::TwoPair => "Two pair",
            Category::ThreeOfAKind => "Three of a kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full house",
            Category::FourOfAKind => "Four of a kind",
            Category::StraightFlush => "Straight flush",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// HandRank
// ---------------------------------------------------------------------------

/// A comparable hand strength.
///
/// `tiebreak` holds rank values (2..=14) in the order they are compared:
/// - straight / straight flush: the five straight ranks, high to low
/// - four of a kind: `[quad, kicker]`
/// - full house: `[trips, pair]`
/// - flush / high card: all five ranks, high to low
/// - three of a kind: `[trips, kicker, kicker]`
/// - two pair: `[high pair, low pair, kicker]`
/// - one pair: `[pair, kicker, kicker, kicker]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank {
    pub category: Category,
    pub tiebreak: Vec<u8>,
}

/// Ranks a five-card hand. The result does not depend on card order.
pub fn rank(cards: &Hand) -> HandRank {
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    // (count, value) per distinct rank, strongest group first:
    // bigger groups before smaller, higher ranks before lower.
    let mut groups: Vec<(usize, u8)> = Vec::with_capacity(5);
    for &v in &values {
        match groups.iter_mut().find(|(_, g)| *g == v) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, v)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let shape: Vec<usize> = groups.iter().map(|&(count, _)| count).collect();
    let grouped: Vec<u8> = groups.iter().map(|&(_, v)| v).collect();
    let flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = straight_ranks(&values);

    let (category, tiebreak) = match (straight, flush, shape.as_slice()) {
        (Some(run), true, _) => (Category::StraightFlush, run),
        (_, _, [4, 1]) => (Category::FourOfAKind, grouped),
        (_, _, [3, 2]) => (Category::FullHouse, grouped),
        (_, true, _) => (Category::Flush, values),
        (Some(run), false, _) => (Category::Straight, run),
        (_, _, [3, 1, 1]) => (Category::ThreeOfAKind, grouped),
        (_, _, [2, 2, 1]) => (Category::TwoPair, grouped),
        (_, _, [2, 1, 1, 1]) => (Category::OnePair, grouped),
        _ => (Category::HighCard, values),
    };

    HandRank { category, tiebreak }
}

/// Returns the straight's ranks high to low, or `None` if `desc` (five
/// values sorted descending) is not a straight.
///
/// The wheel `A-5-4-3-2` plays the ace low, so it ranks as `[5,4,3,2,1]`
/// and loses to every other straight.
fn straight_ranks(desc: &[u8]) -> Option<Vec<u8>> {
    if desc == [14, 5, 4, 3, 2] {
        return Some(vec![5, 4, 3, 2, 1]);
    }
    desc.windows(2)
        .all(|w| w[0] == w[1] + 1)
        .then(|| desc.to_vec())
}

// ---------------------------------------------------------------------------
// Showdown
// ---------------------------------------------------------------------------

/// The outcome of comparing every hand at a showdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The winning strength, shared by every winner.
    pub rank: HandRank,
    /// Every player holding `rank`, in the order the hands were given.
    pub winners: Vec<String>,
}

impl Verdict {
    /// Human-readable name of the winning category.
    pub fn description(&self) -> &'static str {
        self.rank.category.name()
    }
}

/// Finds the strongest hand(s). Returns `None` for an empty table.
///
/// Ties are kept: all players whose hands rank equal to the best appear in
/// `winners`, preserving input order.
pub fn best_hand(hands: &[(String, Hand)]) -> Option<Verdict> {
    let mut verdict: Option<Verdict> = None;

    for (nick, cards) in hands {
        let score = rank(cards);
        let ordering = match &verdict {
            Some(best) => score.cmp(&best.rank),
            None => Ordering::Greater,
        };
        match ordering {
            Ordering::Less => {}
            Ordering::Equal => {
                if let Some(best) = verdict.as_mut() {
                    best.winners.push(nick.clone());
                }
            }
            Ordering::Greater => {
                verdict = Some(Verdict {
                    rank: score,
                    winners: vec![nick.clone()],
                });
            }
        }
    }

    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Card;

    fn hand(tokens: [&str; 5]) -> Hand {
        tokens.map(|t| t.parse::<Card>().expect("valid token"))
    }

    fn category(tokens: [&str; 5]) -> Category {
        rank(&hand(tokens)).category
    }

    /// All 120 orderings of a hand.
    fn permutations(cards: Hand) -> Vec<Hand> {
        fn go(prefix: &mut Vec<Card>, rest: &mut Vec<Card>, out: &mut Vec<Hand>) {
            if rest.is_empty() {
                out.push([prefix[0], prefix[1], prefix[2], prefix[3], prefix[4]]);
                return;
            }
            for i in 0..rest.len() {
                let card = rest.remove(i);
                prefix.push(card);
                go(prefix, rest, out);
                prefix.pop();
                rest.insert(i, card);
            }
        }
        let mut out = Vec::new();
        go(&mut Vec::new(), &mut cards.to_vec(), &mut out);
        out
    }

    #[test]
    fn test_royal_flush_is_straight_flush() {
        let r = rank(&hand(["AS", "KS", "QS", "JS", "TS"]));
        assert_eq!(r.category, Category::StraightFlush);
        assert_eq!(r.category.index(), 8);
        assert_eq!(r.tiebreak, vec![14, 13, 12, 11, 10]);
    }

    #[test]
    fn test_four_of_a_kind_tiebreak() {
        let r = rank(&hand(["2C", "2D", "2H", "2S", "5C"]));
        assert_eq!(r.category, Category::FourOfAKind);
        assert_eq!(r.category.index(), 7);
        assert_eq!(r.tiebreak, vec![2, 5]);
    }

    #[test]
    fn test_every_category_detected() {
        assert_eq!(category(["9H", "8H", "7H", "6H", "5H"]), Category::StraightFlush);
        assert_eq!(category(["KC", "KD", "KH", "KS", "3D"]), Category::FourOfAKind);
        assert_eq!(category(["QC", "QD", "QH", "4S", "4D"]), Category::FullHouse);
        assert_eq!(category(["2D", "7D", "9D", "JD", "KD"]), Category::Flush);
        assert_eq!(category(["9C", "8D", "7H", "6S", "5C"]), Category::Straight);
        assert_eq!(category(["7C", "7D", "7H", "KS", "2C"]), Category::ThreeOfAKind);
        assert_eq!(category(["JC", "JD", "4H", "4S", "AC"]), Category::TwoPair);
        assert_eq!(category(["TC", "TD", "8H", "4S", "2C"]), Category::OnePair);
        assert_eq!(category(["AC", "JD", "8H", "4S", "2C"]), Category::HighCard);
    }

    #[test]
    fn test_categories_are_totally_ordered() {
        let ladder = [
            hand(["AC", "JD", "8H", "4S", "2C"]),
            hand(["TC", "TD", "8H", "4S", "2C"]),
            hand(["JC", "JD", "4H", "4S", "AC"]),
            hand(["7C", "7D", "7H", "KS", "2C"]),
            hand(["9C", "8D", "7H", "6S", "5C"]),
            hand(["2D", "7D", "9D", "JD", "KD"]),
            hand(["QC", "QD", "QH", "4S", "4D"]),
            hand(["KC", "KD", "KH", "KS", "3D"]),
            hand(["9H", "8H", "7H", "6H", "5H"]),
        ];
        let ranks: Vec<HandRank> = ladder.iter().map(rank).collect();
        for (i, r) in ranks.iter().enumerate() {
            assert_eq!(r.category.index() as usize, i);
        }
        for pair in ranks.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should lose to {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rank_is_order_independent() {
        for tokens in [
            ["QC", "QD", "QH", "4S", "4D"],
            ["JC", "JD", "4H", "4S", "AC"],
            ["5S", "AD", "3C", "2H", "4D"],
            ["TC", "TD", "8H", "4S", "2C"],
        ] {
            let base = hand(tokens);
            let expected = rank(&base);
            for perm in permutations(base) {
                assert_eq!(rank(&perm), expected);
            }
        }
    }

    #[test]
    fn test_wheel_is_lowest_straight() {
        let wheel = rank(&hand(["AS", "2D", "3C", "4H", "5D"]));
        assert_eq!(wheel.category, Category::Straight);
        assert_eq!(wheel.tiebreak, vec![5, 4, 3, 2, 1]);

        let six_high = rank(&hand(["2S", "3D", "4C", "5H", "6D"]));
        assert!(wheel < six_high);

        let ace_high = rank(&hand(["AS", "KD", "8C", "4H", "3D"]));
        assert!(wheel > ace_high, "wheel is a straight, not high card");
    }

    #[test]
    fn test_steel_wheel_is_lowest_straight_flush() {
        let steel = rank(&hand(["AH", "2H", "3H", "4H", "5H"]));
        assert_eq!(steel.category, Category::StraightFlush);
        let six_high = rank(&hand(["2C", "3C", "4C", "5C", "6C"]));
        assert!(steel < six_high);
    }

    #[test]
    fn test_near_wheel_is_not_straight() {
        // A-K-4-3-2 wraps around; not a straight.
        assert_eq!(category(["AS", "KD", "4C", "3H", "2D"]), Category::HighCard);
    }

    #[test]
    fn test_kickers_break_ties_within_category() {
        let pair_king_kicker = rank(&hand(["9C", "9D", "KH", "4S", "2C"]));
        let pair_queen_kicker = rank(&hand(["9H", "9S", "QH", "4D", "2D"]));
        assert!(pair_king_kicker > pair_queen_kicker);

        let two_pair = rank(&hand(["JC", "JD", "4H", "4S", "AC"]));
        assert_eq!(two_pair.tiebreak, vec![11, 4, 14]);

        let trips = rank(&hand(["7C", "7D", "7H", "KS", "2C"]));
        assert_eq!(trips.tiebreak, vec![7, 13, 2]);

        let full = rank(&hand(["4S", "4D", "QC", "QD", "QH"]));
        assert_eq!(full.tiebreak, vec![12, 4]);
    }

    #[test]
    fn test_best_hand_picks_single_winner() {
        let hands = vec![
            ("A".to_string(), hand(["AS", "KS", "QS", "JS", "TS"])),
            ("B".to_string(), hand(["2C", "2D", "2H", "2S", "3C"])),
        ];
        let verdict = best_hand(&hands).unwrap();
        assert_eq!(verdict.winners, vec!["A"]);
        assert_eq!(verdict.description(), "Straight flush");
    }

    #[test]
    fn test_best_hand_keeps_ties_in_input_order() {
        let hands = vec![
            ("zed".to_string(), hand(["AC", "JD", "8H", "4S", "2C"])),
            ("low".to_string(), hand(["KC", "JC", "8C", "4D", "2H"])),
            ("amy".to_string(), hand(["AD", "JH", "8S", "4C", "2D"])),
        ];
        let verdict = best_hand(&hands).unwrap();
        assert_eq!(verdict.winners, vec!["zed", "amy"]);
        assert_eq!(verdict.rank.category, Category::HighCard);
    }

    #[test]
    fn test_best_hand_later_winner_replaces_earlier() {
        let hands = vec![
            ("a".to_string(), hand(["TC", "TD", "8H", "4S", "2C"])),
            ("b".to_string(), hand(["TH", "TS", "8D", "4C", "2D"])),
            ("c".to_string(), hand(["3C", "3D", "3H", "4D", "2H"])),
        ];
        let verdict = best_hand(&hands).unwrap();
        assert_eq!(verdict.winners, vec!["c"]);
        assert_eq!(verdict.description(), "Three of a kind");
    }

    #[test]
    fn test_best_hand_empty_table() {
        assert_eq!(best_hand(&[]), None);
    }
}
