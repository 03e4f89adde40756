use omikuji_core::model::board::{Board, DISPLAY_GROUPS};
use omikuji_core::model::hand::evaluate;
use omikuji_core::{CancelOutcome, RoundMachine, RoundPhase};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{AutopilotConfig, Strategy};

/// A display group paired with the column its card goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub group: usize,
    pub column: usize,
}

/// What the autopilot did on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Waited,
    Played { mv: Move, cancel: Option<CancelOutcome> },
    Continued,
    Declined,
}

/// Scripted player that clicks through a game without a host UI.
#[derive(Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    rng: StdRng,
    cooldown: u32,
    continues: u32,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            cooldown: 0,
            continues: 0,
        }
    }

    pub fn continues(&self) -> u32 {
        self.continues
    }

    /// Acts on the machine for the current frame, before it advances.
    pub fn act(&mut self, game: &mut RoundMachine) -> Action {
        match game.phase() {
            RoundPhase::Playing => self.play(game),
            RoundPhase::ContinuePrompt => {
                if self.continues < self.config.max_continues && game.accept_continue() {
                    self.continues += 1;
                    Action::Continued
                } else if game.decline_continue() {
                    Action::Declined
                } else {
                    Action::Waited
                }
            }
            RoundPhase::Menu
            | RoundPhase::Bonus
            | RoundPhase::Won
            | RoundPhase::GameOver
            | RoundPhase::Resetting => Action::Waited,
        }
    }

    fn play(&mut self, game: &mut RoundMachine) -> Action {
        if self.config.strategy == Strategy::Idle {
            return Action::Waited;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Action::Waited;
        }
        self.cooldown = self.config.think_ticks;

        let Some(mv) = choose_move(game.context().board(), self.config.strategy, &mut self.rng)
        else {
            return Action::Waited;
        };

        if let Err(err) = game.select_group(mv.group) {
            debug!(?err, group = mv.group, "autopilot selection refused");
            return Action::Waited;
        }
        if let Err(err) = game.place_in_column(mv.column) {
            debug!(?err, column = mv.column, "autopilot placement refused");
            return Action::Waited;
        }

        let chance = self.config.cancel_chance.clamp(0.0, 1.0);
        let cancel = (chance > 0.0 && self.rng.gen_bool(chance)).then(|| game.cancel());
        Action::Played { mv, cancel }
    }
}

/// Picks the next move for `strategy`, or `None` when nothing can be placed.
pub fn choose_move(board: &Board, strategy: Strategy, rng: &mut StdRng) -> Option<Move> {
    let groups: Vec<usize> = (0..DISPLAY_GROUPS)
        .filter(|&g| board.visible_card(g).is_some())
        .collect();
    let columns: Vec<usize> = (0..board.column_count())
        .filter(|&c| board.can_accept(c))
        .collect();
    if groups.is_empty() || columns.is_empty() {
        return None;
    }

    match strategy {
        Strategy::Idle => None,
        Strategy::Random => {
            let group = *groups.choose(rng)?;
            let column = *columns.choose(rng)?;
            Some(Move { group, column })
        }
        Strategy::Greedy => {
            let mut best: Option<((u32, usize), Move)> = None;
            for &group in &groups {
                let Some(card) = board.visible_card(group) else {
                    continue;
                };
                for &column in &columns {
                    let mut cards = board.columns()[column].cards().to_vec();
                    cards.push(card);
                    let key = (evaluate(&cards).base_points(), cards.len());
                    if best.is_none_or(|(best_key, _)| key > best_key) {
                        best = Some((key, Move { group, column }));
                    }
                }
            }
            best.map(|(_, mv)| mv)
        }
    }
}
