use crate::model::hand::HandRank;
use serde::{Deserialize, Serialize};

const SCORE_TABLE_CAPACITY: usize = 10;

/// Point values that vary between rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    pub clear_point_base: u32,
    pub clear_point_step: u32,
    pub cancel_bonus: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            clear_point_base: 80,
            clear_point_step: 40,
            cancel_bonus: 50,
        }
    }
}

impl ScoreRules {
    pub fn clear_point(&self, level: u32) -> u32 {
        self.clear_point_base
            .saturating_add(self.clear_point_step.saturating_mul(level.max(1) - 1))
    }
}

/// Round score, running total and the current level's clear point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    rules: ScoreRules,
    level: u32,
    current_score: u32,
    total_score: u64,
    clear_point: u32,
}

impl Score {
    pub fn new(rules: ScoreRules) -> Self {
        Self {
            rules,
            level: 1,
            current_score: 0,
            total_score: 0,
            clear_point: rules.clear_point(1),
        }
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }

    pub fn current_score(&self) -> u32 {
        self.current_score
    }

    pub fn set_current_score(&mut self, score: u32) {
        self.current_score = score;
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn clear_point(&self) -> u32 {
        self.clear_point
    }

    pub fn set_clear_point(&mut self, level: u32) {
        self.level = level.max(1);
        self.clear_point = self.rules.clear_point(self.level);
    }

    /// Adds a completed hand, scaled by the level.
    pub fn update_score(&mut self, rank: HandRank) {
        let points = rank.base_points().saturating_mul(self.level);
        self.current_score = self.current_score.saturating_add(points);
    }

    pub fn is_win(&self) -> bool {
        self.current_score >= self.clear_point
    }

    /// Banks the round score into the running total.
    pub fn extend(&mut self) {
        self.total_score += u64::from(self.current_score);
    }

    pub fn update_total_score(&mut self, cancels_left: u8, bonus: u32) {
        let award = u64::from(cancels_left) * u64::from(self.rules.cancel_bonus) + u64::from(bonus);
        self.total_score += award;
    }

    pub fn reset_round(&mut self) {
        self.current_score = 0;
    }

    pub fn reset_all(&mut self) {
        self.current_score = 0;
        self.total_score = 0;
        self.set_clear_point(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub level: u32,
    pub total: u64,
}

/// Best finished games, highest total first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTable {
    entries: Vec<ScoreEntry>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(SCORE_TABLE_CAPACITY),
        }
    }

    /// Inserts after existing entries with an equal total. Returns the
    /// placement, or `None` when the entry did not make the table.
    pub fn record(&mut self, entry: ScoreEntry) -> Option<usize> {
        let position = self
            .entries
            .iter()
            .position(|e| e.total < entry.total)
            .unwrap_or(self.entries.len());
        if position >= SCORE_TABLE_CAPACITY {
            return None;
        }
        self.entries.insert(position, entry);
        self.entries.truncate(SCORE_TABLE_CAPACITY);
        Some(position)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<ScoreEntry> {
        self.entries.first().copied()
    }
}
