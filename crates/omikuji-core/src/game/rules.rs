use crate::model::score::ScoreRules;
use serde::{Deserialize, Serialize};

/// Tunables for one game. Every field has a default so partial YAML works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    pub countdown_seconds: u32,
    pub ticks_per_second: u32,
    pub cancel_budget: u8,
    pub bonus_spin_ticks: u32,
    pub score: ScoreRules,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            countdown_seconds: 10,
            ticks_per_second: 60,
            cancel_budget: 3,
            bonus_spin_ticks: 180,
            score: ScoreRules::default(),
        }
    }
}
