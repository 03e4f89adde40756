use crate::game::rules::RoundRules;
use crate::game::snapshot::{Snapshot, SnapshotHistory};
use crate::model::board::{Board, PlacementError};
use crate::model::card::Card;
use crate::model::hand::HandRank;
use crate::model::score::Score;
use crate::model::timer::Timer;

/// A card picked from a display group but not yet placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCard {
    pub group: usize,
    pub card: Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column: usize,
    pub card: Card,
    pub rank: Option<HandRank>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    NotPlaying,
    NoPendingCard,
    GroupEmpty(usize),
    Placement(PlacementError),
}

impl From<PlacementError> for MoveError {
    fn from(err: PlacementError) -> Self {
        MoveError::Placement(err)
    }
}

/// Everything a round mutates while cards are being played. The auto-committer
/// and the cancel controller work on this directly.
#[derive(Debug, Clone)]
pub struct PlayContext {
    pub(crate) board: Board,
    pub(crate) score: Score,
    pub(crate) timer: Timer,
    pub(crate) history: SnapshotHistory,
    pub(crate) pending: Option<PendingCard>,
    pub(crate) cancels_left: u8,
}

impl PlayContext {
    /// Fresh round on `board`, with the opening position already recorded.
    pub fn new(board: Board, score: Score, rules: &RoundRules) -> Self {
        let history = SnapshotHistory::new(board.column_count());
        let mut ctx = Self {
            board,
            score,
            timer: Timer::new(rules.countdown_seconds),
            history,
            pending: None,
            cancels_left: rules.cancel_budget,
        };
        ctx.record_snapshot();
        ctx
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn pending(&self) -> Option<PendingCard> {
        self.pending
    }

    pub fn cancels_left(&self) -> u8 {
        self.cancels_left
    }

    pub fn record_snapshot(&mut self) {
        let snapshot = Snapshot::capture(&self.board, &self.score);
        self.history.record(snapshot);
    }

    /// Marks the visible card of `group` as pending, replacing any earlier pick.
    pub fn select(&mut self, group: usize) -> Result<PendingCard, MoveError> {
        let card = self
            .board
            .visible_card(group)
            .ok_or(MoveError::GroupEmpty(group))?;
        let pending = PendingCard { group, card };
        self.pending = Some(pending);
        Ok(pending)
    }

    /// Player-driven commit of the pending card.
    pub fn place_pending(&mut self, column: usize) -> Result<Placement, MoveError> {
        let pending = self.pending.ok_or(MoveError::NoPendingCard)?;
        let placement = self.commit(pending.group, pending.card, column)?;
        self.timer.reset();
        Ok(placement)
    }

    /// Places `card` from `group` into `column`, consumes it from the display,
    /// clears the pending pick and records exactly one snapshot.
    pub(crate) fn commit(
        &mut self,
        group: usize,
        card: Card,
        column: usize,
    ) -> Result<Placement, MoveError> {
        let rank = self.board.add_card(column, card, &mut self.score)?;
        // `card` was read from the front of `group`, so it is always there to take.
        let consumed = self.board.consume(group);
        debug_assert_eq!(consumed, Some(card), "committed card was not at the front of its group");
        self.pending = None;
        self.record_snapshot();
        Ok(Placement { column, card, rank })
    }

    /// Replaces board and score with a recorded state.
    pub(crate) fn restore(&mut self, snapshot: &Snapshot) {
        self.board.apply_snapshot(snapshot);
        self.score.set_current_score(snapshot.score());
    }
}

#[cfg(test)]
mod tests {
    use super::{MoveError, PlayContext};
    use crate::game::rules::RoundRules;
    use crate::model::board::{Board, PlacementError};
    use crate::model::deck::Deck;
    use crate::model::score::Score;

    fn context() -> PlayContext {
        let rules = RoundRules::default();
        PlayContext::new(Board::deal(&Deck::standard()), Score::new(rules.score), &rules)
    }

    #[test]
    fn new_context_records_opening_position() {
        let ctx = context();
        assert_eq!(ctx.history().len(), 1);
        assert_eq!(ctx.cancels_left(), 3);
        assert!(ctx.pending().is_none());
    }

    #[test]
    fn placing_requires_a_pending_card() {
        let mut ctx = context();
        assert_eq!(ctx.place_pending(0), Err(MoveError::NoPendingCard));
    }

    #[test]
    fn manual_commit_consumes_display_and_records() {
        let mut ctx = context();
        let pending = ctx.select(2).unwrap();
        let before = ctx.board().display_counts()[2];
        let placement = ctx.place_pending(4).unwrap();
        assert_eq!(placement.card, pending.card);
        assert_eq!(ctx.board().display_counts()[2], before - 1);
        assert_eq!(ctx.board().columns()[4].cards(), &[pending.card]);
        assert!(ctx.pending().is_none());
        assert_eq!(ctx.history().len(), 2);
    }

    #[test]
    fn failed_commit_keeps_pending_and_history() {
        let mut ctx = context();
        ctx.select(0).unwrap();
        assert_eq!(
            ctx.place_pending(9),
            Err(MoveError::Placement(PlacementError::ColumnOutOfRange(9)))
        );
        assert!(ctx.pending().is_some());
        assert_eq!(ctx.history().len(), 1);
    }

    #[test]
    fn manual_commit_restarts_the_countdown() {
        let mut ctx = context();
        ctx.select(1).unwrap();
        for _ in 0..7 {
            ctx.timer.tick_down();
        }
        assert_eq!(ctx.timer().seconds_remaining(), 3);
        ctx.place_pending(0).unwrap();
        assert_eq!(
            ctx.timer().seconds_remaining(),
            RoundRules::default().countdown_seconds
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "committed card was not at the front of its group")]
    fn commit_catches_a_card_from_the_wrong_group() {
        use crate::model::card::Card;
        use crate::model::rank::Rank;
        use crate::model::suit::Suit;

        let rules = RoundRules::default();
        let front = Card::new(Rank::Queen, Suit::Hearts);
        let other = Card::new(Rank::Three, Suit::Clubs);
        let board = Board::with_groups([vec![front], vec![other], vec![], vec![]]);
        let mut ctx = PlayContext::new(board, Score::new(rules.score), &rules);
        let _ = ctx.commit(0, other, 0);
    }
}
