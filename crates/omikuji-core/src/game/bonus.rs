use core::fmt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Outcome of the post-win coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusBranch {
    Omikuji,
    NoBonus,
}

/// Omikuji slip, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fortune {
    Daikichi,
    Kichi,
    Chukichi,
    Shokichi,
    Suekichi,
    Kyo,
}

impl Fortune {
    pub const ALL: [Fortune; 6] = [
        Fortune::Daikichi,
        Fortune::Kichi,
        Fortune::Chukichi,
        Fortune::Shokichi,
        Fortune::Suekichi,
        Fortune::Kyo,
    ];

    const WEIGHTS: [u32; 6] = [10, 20, 20, 20, 15, 15];

    pub const fn bonus_points(self) -> u32 {
        match self {
            Fortune::Daikichi => 500,
            Fortune::Kichi => 300,
            Fortune::Chukichi => 200,
            Fortune::Shokichi => 100,
            Fortune::Suekichi => 50,
            Fortune::Kyo => 0,
        }
    }

    /// Ends the game when drawn as a continue retry.
    pub const fn is_misfortune(self) -> bool {
        matches!(self, Fortune::Kyo)
    }

    pub const fn kanji(self) -> &'static str {
        match self {
            Fortune::Daikichi => "大吉",
            Fortune::Kichi => "吉",
            Fortune::Chukichi => "中吉",
            Fortune::Shokichi => "小吉",
            Fortune::Suekichi => "末吉",
            Fortune::Kyo => "凶",
        }
    }
}

impl fmt::Display for Fortune {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kanji())
    }
}

/// Source of the round's random outcomes.
pub trait BonusDraw {
    fn branch(&mut self) -> BonusBranch;
    fn fortune(&mut self) -> Fortune;
}

/// Uniform branch and weighted fortune from any `Rng`.
#[derive(Debug, Clone)]
pub struct RngBonusDraw<R = StdRng> {
    rng: R,
}

impl RngBonusDraw<StdRng> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RngBonusDraw<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> BonusDraw for RngBonusDraw<R> {
    fn branch(&mut self) -> BonusBranch {
        if self.rng.gen_range(0..2) == 0 {
            BonusBranch::Omikuji
        } else {
            BonusBranch::NoBonus
        }
    }

    fn fortune(&mut self) -> Fortune {
        let total: u32 = Fortune::WEIGHTS.iter().sum();
        let mut roll = self.rng.gen_range(0..total);
        for (fortune, weight) in Fortune::ALL.iter().zip(Fortune::WEIGHTS) {
            if roll < weight {
                return *fortune;
            }
            roll -= weight;
        }
        Fortune::Kyo
    }
}

/// Replays fixed outcomes in order, cycling once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBonusDraw {
    branches: Vec<BonusBranch>,
    fortunes: Vec<Fortune>,
    next_branch: usize,
    next_fortune: usize,
}

impl ScriptedBonusDraw {
    pub fn new(branches: Vec<BonusBranch>, fortunes: Vec<Fortune>) -> Self {
        Self {
            branches,
            fortunes,
            next_branch: 0,
            next_fortune: 0,
        }
    }
}

impl BonusDraw for ScriptedBonusDraw {
    fn branch(&mut self) -> BonusBranch {
        if self.branches.is_empty() {
            return BonusBranch::NoBonus;
        }
        let branch = self.branches[self.next_branch % self.branches.len()];
        self.next_branch += 1;
        branch
    }

    fn fortune(&mut self) -> Fortune {
        if self.fortunes.is_empty() {
            return Fortune::Suekichi;
        }
        let fortune = self.fortunes[self.next_fortune % self.fortunes.len()];
        self.next_fortune += 1;
        fortune
    }
}

#[cfg(test)]
mod tests {
    use super::{BonusBranch, BonusDraw, Fortune, RngBonusDraw, ScriptedBonusDraw};

    #[test]
    fn seeded_draws_repeat() {
        let mut a = RngBonusDraw::with_seed(11);
        let mut b = RngBonusDraw::with_seed(11);
        for _ in 0..32 {
            assert_eq!(a.branch(), b.branch());
            assert_eq!(a.fortune(), b.fortune());
        }
    }

    #[test]
    fn both_branches_occur() {
        let mut draw = RngBonusDraw::with_seed(5);
        let branches: Vec<_> = (0..200).map(|_| draw.branch()).collect();
        assert!(branches.contains(&BonusBranch::Omikuji));
        assert!(branches.contains(&BonusBranch::NoBonus));
    }

    #[test]
    fn scripted_draw_cycles() {
        let mut draw = ScriptedBonusDraw::new(
            vec![BonusBranch::Omikuji, BonusBranch::NoBonus],
            vec![Fortune::Kyo],
        );
        assert_eq!(draw.branch(), BonusBranch::Omikuji);
        assert_eq!(draw.branch(), BonusBranch::NoBonus);
        assert_eq!(draw.branch(), BonusBranch::Omikuji);
        assert_eq!(draw.fortune(), Fortune::Kyo);
        assert_eq!(draw.fortune(), Fortune::Kyo);
    }

    #[test]
    fn only_kyo_is_a_misfortune() {
        let bad: Vec<_> = Fortune::ALL.into_iter().filter(|f| f.is_misfortune()).collect();
        assert_eq!(bad, vec![Fortune::Kyo]);
        assert_eq!(Fortune::Daikichi.to_string(), "大吉");
    }
}
