use crate::game::snapshot::Snapshot;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::{Hand, HandRank};
use crate::model::score::Score;
use std::array;

pub const COLUMN_COUNT: usize = 5;
pub const DISPLAY_GROUPS: usize = 4;
pub const GROUP_SIZE: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    ColumnOutOfRange(usize),
    ColumnFull(usize),
}

/// Board columns plus the four display groups the player draws from.
///
/// A display group never changes order during a round; `counts[g]` is how many
/// of its cards are still available, and the visible card is the first one
/// not yet consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Hand>,
    groups: [Vec<Card>; DISPLAY_GROUPS],
    counts: [u8; DISPLAY_GROUPS],
}

impl Board {
    /// Splits the first 52 cards of the deck into four groups of 13.
    pub fn deal(deck: &Deck) -> Self {
        let groups = array::from_fn(|g| {
            deck.cards()
                .iter()
                .skip(g * GROUP_SIZE)
                .take(GROUP_SIZE)
                .copied()
                .collect()
        });
        Self::with_groups(groups)
    }

    pub fn with_groups(groups: [Vec<Card>; DISPLAY_GROUPS]) -> Self {
        let counts = array::from_fn(|g| groups[g].len().min(u8::MAX as usize) as u8);
        Self {
            columns: (0..COLUMN_COUNT).map(|_| Hand::new()).collect(),
            groups,
            counts,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Hand] {
        &self.columns
    }

    pub fn groups(&self) -> &[Vec<Card>; DISPLAY_GROUPS] {
        &self.groups
    }

    pub fn display_counts(&self) -> [u8; DISPLAY_GROUPS] {
        self.counts
    }

    pub fn can_accept(&self, column: usize) -> bool {
        self.columns
            .get(column)
            .is_some_and(|hand| !hand.is_complete())
    }

    /// Places `card` in `column`. Completing a column scores its hand.
    pub fn add_card(
        &mut self,
        column: usize,
        card: Card,
        score: &mut Score,
    ) -> Result<Option<HandRank>, PlacementError> {
        let hand = self
            .columns
            .get_mut(column)
            .ok_or(PlacementError::ColumnOutOfRange(column))?;
        if hand.is_complete() {
            return Err(PlacementError::ColumnFull(column));
        }
        hand.add(card);
        let rank = hand.rank();
        if let Some(rank) = rank {
            score.update_score(rank);
        }
        Ok(rank)
    }

    pub fn is_full(&self) -> bool {
        self.columns.iter().all(Hand::is_complete)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Hand::is_empty)
    }

    pub fn visible_card(&self, group: usize) -> Option<Card> {
        let cards = self.groups.get(group)?;
        let remaining = *self.counts.get(group)? as usize;
        if remaining == 0 {
            return None;
        }
        cards.get(cards.len() - remaining).copied()
    }

    /// Lowest-index group that still has a card, with that card.
    pub fn first_pending_card(&self) -> Option<(usize, Card)> {
        (0..DISPLAY_GROUPS).find_map(|g| self.visible_card(g).map(|card| (g, card)))
    }

    /// Removes the visible card from `group`.
    pub fn consume(&mut self, group: usize) -> Option<Card> {
        let card = self.visible_card(group)?;
        self.counts[group] -= 1;
        Some(card)
    }

    pub fn cells(&self) -> Vec<Vec<Card>> {
        self.columns.iter().map(|hand| hand.cards().to_vec()).collect()
    }

    /// Overwrites columns and display counts from a recorded snapshot.
    ///
    /// # Panics
    /// If the snapshot was taken from a board with a different column count.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        assert_eq!(
            snapshot.board_cells().len(),
            self.columns.len(),
            "snapshot column count does not match the board"
        );
        self.columns = snapshot
            .board_cells()
            .iter()
            .map(|cells| Hand::with_cards(cells.clone()))
            .collect();
        self.counts = snapshot.pending_counts();
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, COLUMN_COUNT, DISPLAY_GROUPS, GROUP_SIZE, PlacementError};
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::hand::HAND_SIZE;
    use crate::model::rank::Rank;
    use crate::model::score::{Score, ScoreRules};
    use crate::model::suit::Suit;

    fn score() -> Score {
        Score::new(ScoreRules::default())
    }

    #[test]
    fn deal_splits_four_groups_of_thirteen() {
        let deck = Deck::shuffled_with_seed(3);
        let board = Board::deal(&deck);
        assert_eq!(board.display_counts(), [GROUP_SIZE as u8; DISPLAY_GROUPS]);
        assert_eq!(board.visible_card(0), Some(deck.cards()[0]));
        assert_eq!(board.visible_card(3), Some(deck.cards()[3 * GROUP_SIZE]));
        assert!(board.is_empty());
        assert_eq!(board.column_count(), COLUMN_COUNT);
    }

    #[test]
    fn consume_advances_visible_card() {
        let deck = Deck::standard();
        let mut board = Board::deal(&deck);
        assert_eq!(board.consume(1), Some(deck.cards()[GROUP_SIZE]));
        assert_eq!(board.visible_card(1), Some(deck.cards()[GROUP_SIZE + 1]));
        assert_eq!(board.display_counts()[1], GROUP_SIZE as u8 - 1);
    }

    #[test]
    fn first_pending_card_skips_empty_groups() {
        let card = Card::new(Rank::Five, Suit::Clubs);
        let board = Board::with_groups([vec![], vec![], vec![card], vec![]]);
        assert_eq!(board.first_pending_card(), Some((2, card)));
    }

    #[test]
    fn full_column_rejects_cards() {
        let mut board = Board::deal(&Deck::standard());
        let mut score = score();
        let card = Card::new(Rank::Two, Suit::Hearts);
        for _ in 0..HAND_SIZE {
            board.add_card(0, card, &mut score).unwrap();
        }
        assert_eq!(
            board.add_card(0, card, &mut score),
            Err(PlacementError::ColumnFull(0))
        );
        assert_eq!(
            board.add_card(COLUMN_COUNT, card, &mut score),
            Err(PlacementError::ColumnOutOfRange(COLUMN_COUNT))
        );
        assert!(!board.can_accept(0));
        assert!(board.can_accept(1));
    }

    #[test]
    fn completing_a_column_scores_the_hand() {
        let mut board = Board::deal(&Deck::standard());
        let mut score = score();
        let ranks = [Rank::Nine, Rank::Nine, Rank::Four, Rank::Six, Rank::King];
        let mut last = None;
        for (i, rank) in ranks.into_iter().enumerate() {
            let suit = Suit::from_index(i % 4).unwrap();
            last = board.add_card(2, Card::new(rank, suit), &mut score).unwrap();
        }
        assert_eq!(last.map(|r| r.base_points()), Some(10));
        assert_eq!(score.current_score(), 10);
    }

    #[test]
    fn board_is_full_when_every_column_completes() {
        let mut board = Board::deal(&Deck::standard());
        let mut score = score();
        let card = Card::new(Rank::Three, Suit::Spades);
        for column in 0..COLUMN_COUNT {
            for _ in 0..HAND_SIZE {
                assert!(!board.is_full());
                board.add_card(column, card, &mut score).unwrap();
            }
        }
        assert!(board.is_full());
    }
}
