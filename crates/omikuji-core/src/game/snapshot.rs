use crate::model::board::{Board, DISPLAY_GROUPS};
use crate::model::card::Card;
use crate::model::score::Score;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 5;

/// Board and score as they stood after one committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    score: u32,
    board_cells: Vec<Vec<Card>>,
    pending_counts: [u8; DISPLAY_GROUPS],
}

impl Snapshot {
    pub fn new(score: u32, board_cells: Vec<Vec<Card>>, pending_counts: [u8; DISPLAY_GROUPS]) -> Self {
        Self {
            score,
            board_cells,
            pending_counts,
        }
    }

    pub fn capture(board: &Board, score: &Score) -> Self {
        Self::new(score.current_score(), board.cells(), board.display_counts())
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn board_cells(&self) -> &[Vec<Card>] {
        &self.board_cells
    }

    pub fn pending_counts(&self) -> [u8; DISPLAY_GROUPS] {
        self.pending_counts
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Most recent snapshots, oldest evicted first once five are held.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    columns: usize,
    entries: VecDeque<Snapshot>,
}

impl SnapshotHistory {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            entries: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// # Panics
    /// If the snapshot's column count differs from the board this history
    /// was created for.
    pub fn record(&mut self, snapshot: Snapshot) {
        assert_eq!(
            snapshot.board_cells.len(),
            self.columns,
            "snapshot recorded with a malformed board"
        );
        self.entries.push_back(snapshot);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// The state one move back from the latest.
    pub fn second_most_recent(&self) -> Option<&Snapshot> {
        self.entries.len().checked_sub(2).and_then(|i| self.entries.get(i))
    }

    /// Drops the latest entry and hands back the one before it, which the
    /// caller re-records once restored. Leaves history untouched when fewer
    /// than two entries exist.
    pub fn rewind(&mut self) -> Option<Snapshot> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop_back();
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{HISTORY_CAPACITY, Snapshot, SnapshotHistory};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn snap(score: u32) -> Snapshot {
        Snapshot::new(score, vec![Vec::new(); 3], [13; 4])
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let mut history = SnapshotHistory::new(3);
        for score in 0..12 {
            history.record(snap(score));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        let scores: Vec<_> = history.iter().map(Snapshot::score).collect();
        assert_eq!(scores, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn second_most_recent_needs_two_entries() {
        let mut history = SnapshotHistory::new(3);
        assert!(history.second_most_recent().is_none());
        history.record(snap(1));
        assert!(history.second_most_recent().is_none());
        history.record(snap(2));
        assert_eq!(history.second_most_recent().map(Snapshot::score), Some(1));
        assert_eq!(history.latest().map(Snapshot::score), Some(2));
    }

    #[test]
    fn rewind_walks_backwards() {
        let mut history = SnapshotHistory::new(3);
        for score in 1..=3 {
            history.record(snap(score));
        }
        let restored = history.rewind().unwrap();
        assert_eq!(restored.score(), 2);
        history.record(restored);
        let restored = history.rewind().unwrap();
        assert_eq!(restored.score(), 1);
        history.record(restored);
        assert_eq!(history.len(), 1);
        assert!(history.rewind().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    #[should_panic(expected = "malformed board")]
    fn recording_wrong_column_count_panics() {
        let mut history = SnapshotHistory::new(5);
        history.record(snap(0));
    }

    #[test]
    fn snapshot_serializes_cards() {
        let cells = vec![vec![Card::new(Rank::Ace, Suit::Hearts)], vec![], vec![]];
        let json = Snapshot::new(40, cells, [12, 13, 13, 13]).to_json().unwrap();
        assert!(json.contains("\"score\":40"));
        assert!(json.contains("\"Ace\""));
    }
}
