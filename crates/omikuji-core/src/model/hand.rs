use crate::model::card::Card;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};

pub const HAND_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandRank {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
    FiveOfAKind,
}

impl HandRank {
    /// Base points before the level multiplier.
    pub const fn base_points(self) -> u32 {
        match self {
            HandRank::HighCard => 0,
            HandRank::Pair => 10,
            HandRank::TwoPair => 20,
            HandRank::ThreeOfAKind => 40,
            HandRank::Straight => 60,
            HandRank::Flush => 80,
            HandRank::FullHouse => 100,
            HandRank::FourOfAKind => 150,
            HandRank::StraightFlush => 300,
            HandRank::RoyalFlush => 500,
            HandRank::FiveOfAKind => 600,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HandRank::HighCard => "high card",
            HandRank::Pair => "pair",
            HandRank::TwoPair => "two pair",
            HandRank::ThreeOfAKind => "three of a kind",
            HandRank::Straight => "straight",
            HandRank::Flush => "flush",
            HandRank::FullHouse => "full house",
            HandRank::FourOfAKind => "four of a kind",
            HandRank::StraightFlush => "straight flush",
            HandRank::RoyalFlush => "royal flush",
            HandRank::FiveOfAKind => "five of a kind",
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One board column. Cards keep placement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: Vec::with_capacity(HAND_SIZE),
        }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cards.len() >= HAND_SIZE
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Rank of the finished hand, `None` while the column still has room.
    pub fn rank(&self) -> Option<HandRank> {
        self.is_complete().then(|| evaluate(&self.cards))
    }
}

/// Best poker hand for up to five cards, jokers filling in as any card.
pub fn evaluate(cards: &[Card]) -> HandRank {
    let mut rank_counts = [0u8; 15];
    let mut suit_counts = [0u8; 4];
    let mut wilds = 0u8;

    for card in cards {
        match (card.rank(), card.suit()) {
            (Some(rank), Some(suit)) => {
                rank_counts[rank.value() as usize] += 1;
                suit_counts[suit.index()] += 1;
            }
            _ => wilds += 1,
        }
    }

    let mut counts: Vec<u8> = rank_counts.iter().copied().filter(|&c| c > 0).collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));
    let first = counts.first().copied().unwrap_or(0);
    let second = counts.get(1).copied().unwrap_or(0);

    let full = cards.len() >= HAND_SIZE;
    let is_flush = full && suit_counts.iter().filter(|&&c| c > 0).count() <= 1;
    let straight_low = if full { straight_window(&rank_counts) } else { None };

    if first + wilds >= 5 {
        HandRank::FiveOfAKind
    } else if is_flush && straight_low == Some(Rank::Ten.value()) {
        HandRank::RoyalFlush
    } else if is_flush && straight_low.is_some() {
        HandRank::StraightFlush
    } else if first + wilds >= 4 {
        HandRank::FourOfAKind
    } else if 3u8.saturating_sub(first) + 2u8.saturating_sub(second) <= wilds && first + second + wilds >= 5 {
        HandRank::FullHouse
    } else if is_flush {
        HandRank::Flush
    } else if straight_low.is_some() {
        HandRank::Straight
    } else if first + wilds >= 3 {
        HandRank::ThreeOfAKind
    } else if first >= 2 && second >= 2 {
        HandRank::TwoPair
    } else if first + wilds >= 2 {
        HandRank::Pair
    } else {
        HandRank::HighCard
    }
}

/// Highest starting value of a five-rank run the naturals fit into, with
/// gaps left for wilds. The ace plays low in the wheel (A-2-3-4-5).
fn straight_window(rank_counts: &[u8; 15]) -> Option<u8> {
    if rank_counts.iter().any(|&c| c > 1) {
        return None;
    }
    let present: Vec<u8> = (2..=14u8).filter(|&v| rank_counts[v as usize] == 1).collect();
    (1..=10u8).rev().find(|&low| {
        present.iter().all(|&v| {
            let v = if low == 1 && v == 14 { 1 } else { v };
            (low..low + 5).contains(&v)
        })
    })
}
