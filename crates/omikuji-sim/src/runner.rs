use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use omikuji_core::model::score::ScoreEntry;
use omikuji_core::{Fortune, GameEvent, RoundMachine, RoundPhase};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::autopilot::Autopilot;
use crate::config::{ResolvedOutputs, SimConfig};
use crate::logging::TELEMETRY_FILE;

const AUTOPILOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Plays the configured number of games and writes one JSONL row per game.
pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub best: Option<ScoreEntry>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

/// How a simulated game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEnding {
    /// The autopilot declined a continue prompt.
    Declined,
    /// A continue retry drew 凶.
    Misfortune,
    /// `games.max_ticks` ran out first.
    TickLimit,
}

impl GameEnding {
    const fn as_str(self) -> &'static str {
        match self {
            GameEnding::Declined => "declined",
            GameEnding::Misfortune => "misfortune",
            GameEnding::TickLimit => "tick_limit",
        }
    }
}

/// One JSONL row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRow {
    pub run_id: String,
    pub game_index: usize,
    pub seed: u64,
    pub ending: GameEnding,
    pub final_level: u32,
    pub total_score: u64,
    pub levels_cleared: u32,
    pub continues: u32,
    pub manual_placements: u32,
    pub auto_placements: u32,
    pub cancels_used: u32,
    pub rollbacks: u32,
    pub hands: BTreeMap<String, u32>,
    pub fortunes: Vec<Fortune>,
    pub ticks: u64,
}

#[derive(Debug, Default)]
struct Tally {
    levels_cleared: u32,
    manual_placements: u32,
    auto_placements: u32,
    cancels_used: u32,
    rollbacks: u32,
    hands: BTreeMap<String, u32>,
    fortunes: Vec<Fortune>,
}

impl Tally {
    fn absorb(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::CardPlaced { auto: true, .. } => self.auto_placements += 1,
                GameEvent::CardPlaced { auto: false, .. } => self.manual_placements += 1,
                GameEvent::HandCompleted { rank, .. } => {
                    *self.hands.entry(rank.as_str().to_string()).or_default() += 1;
                }
                GameEvent::CancelUsed { rolled_back, .. } => {
                    self.cancels_used += 1;
                    if rolled_back {
                        self.rollbacks += 1;
                    }
                }
                GameEvent::LevelChanged { level } if level > 1 => self.levels_cleared += 1,
                GameEvent::FortuneDrawn { fortune } => self.fortunes.push(fortune),
                _ => {}
            }
        }
    }
}

impl SimRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows = Vec::with_capacity(self.config.games.count);

        for game_index in 0..self.config.games.count {
            let seed = rng.next_u64();
            let row = self.play_game(game_index, seed)?;
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows.push(row);
        }
        writer.flush()?;

        write_summary(&self.outputs.summary_md, &self.config.run_id, &rows)?;

        let best = rows
            .iter()
            .map(|row| ScoreEntry {
                level: row.final_level,
                total: row.total_score,
            })
            .max_by_key(|entry| (entry.total, entry.level));

        let telemetry_path = self
            .config
            .logging
            .enable_structured
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            games_played: rows.len(),
            rows_written: rows.len(),
            best,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(&self, game_index: usize, seed: u64) -> Result<GameRow, RunnerError> {
        let mut game = RoundMachine::with_seed(self.config.rules, seed);
        if !game.start() {
            return Err(RunnerError::game(format!(
                "game {game_index} did not leave the menu (phase {})",
                game.phase()
            )));
        }
        let mut autopilot = Autopilot::new(self.config.autopilot.clone(), seed ^ AUTOPILOT_SEED_SALT);
        let mut tally = Tally::default();
        let mut ending = GameEnding::TickLimit;
        let mut ticks = 0u64;

        while ticks < self.config.games.max_ticks {
            autopilot.act(&mut game);
            game.advance();
            ticks += 1;
            tally.absorb(game.drain_events());

            if !game.score_table().entries().is_empty() {
                ending = if game.phase() == RoundPhase::GameOver {
                    GameEnding::Declined
                } else {
                    GameEnding::Misfortune
                };
                break;
            }
        }

        let (final_level, total_score) = match game.score_table().best() {
            Some(entry) => (entry.level, entry.total),
            None => (game.level(), game.context().score().total_score()),
        };

        event!(
            Level::INFO,
            game_index,
            seed,
            ending = ending.as_str(),
            final_level,
            total_score,
            ticks,
            "game finished"
        );

        Ok(GameRow {
            run_id: self.config.run_id.clone(),
            game_index,
            seed,
            ending,
            final_level,
            total_score,
            levels_cleared: tally.levels_cleared,
            continues: autopilot.continues(),
            manual_placements: tally.manual_placements,
            auto_placements: tally.auto_placements,
            cancels_used: tally.cancels_used,
            rollbacks: tally.rollbacks,
            hands: tally.hands,
            fortunes: tally.fortunes,
            ticks,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_summary(path: &Path, run_id: &str, rows: &[GameRow]) -> Result<(), RunnerError> {
    let games = rows.len().max(1) as f64;
    let mean_total = rows.iter().map(|r| r.total_score as f64).sum::<f64>() / games;
    let mean_cleared = rows.iter().map(|r| f64::from(r.levels_cleared)).sum::<f64>() / games;
    let best_total = rows.iter().map(|r| r.total_score).max().unwrap_or(0);
    let highest_level = rows.iter().map(|r| r.final_level).max().unwrap_or(0);
    let placements: u32 = rows
        .iter()
        .map(|r| r.manual_placements + r.auto_placements)
        .sum();
    let auto: u32 = rows.iter().map(|r| r.auto_placements).sum();
    let auto_share = if placements == 0 {
        0.0
    } else {
        f64::from(auto) / f64::from(placements) * 100.0
    };

    let mut endings: BTreeMap<GameEnding, usize> = BTreeMap::new();
    let mut fortunes: BTreeMap<Fortune, usize> = BTreeMap::new();
    let mut hands: BTreeMap<&str, u32> = BTreeMap::new();
    for row in rows {
        *endings.entry(row.ending).or_default() += 1;
        for fortune in &row.fortunes {
            *fortunes.entry(*fortune).or_default() += 1;
        }
        for (hand, count) in &row.hands {
            *hands.entry(hand.as_str()).or_default() += count;
        }
    }

    let mut md = String::new();
    writeln!(md, "# Simulation `{run_id}`")?;
    writeln!(md)?;
    writeln!(md, "| Metric | Value |")?;
    writeln!(md, "|---|---|")?;
    writeln!(md, "| Games | {} |", rows.len())?;
    writeln!(md, "| Mean total | {mean_total:.1} |")?;
    writeln!(md, "| Best total | {best_total} |")?;
    writeln!(md, "| Highest level | {highest_level} |")?;
    writeln!(md, "| Mean levels cleared | {mean_cleared:.2} |")?;
    writeln!(md, "| Auto placements | {auto_share:.1}% |")?;

    writeln!(md)?;
    writeln!(md, "## Endings")?;
    writeln!(md)?;
    writeln!(md, "| Ending | Games |")?;
    writeln!(md, "|---|---|")?;
    for (ending, count) in &endings {
        writeln!(md, "| {} | {count} |", ending.as_str())?;
    }

    if !fortunes.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Fortunes")?;
        writeln!(md)?;
        writeln!(md, "| Fortune | Draws |")?;
        writeln!(md, "|---|---|")?;
        for (fortune, count) in &fortunes {
            writeln!(md, "| {fortune} {fortune:?} | {count} |")?;
        }
    }

    if !hands.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Completed hands")?;
        writeln!(md)?;
        writeln!(md, "| Hand | Count |")?;
        writeln!(md, "|---|---|")?;
        for (hand, count) in &hands {
            writeln!(md, "| {hand} | {count} |")?;
        }
    }

    fs::write(path, md)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("failed to format summary: {0}")]
    Format(#[from] std::fmt::Error),
    #[error("game execution failed: {message}")]
    Game { message: String },
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[cfg(test)]
mod tests {
    use super::{GameEnding, Tally};
    use omikuji_core::model::card::{Card, JokerColor};
    use omikuji_core::model::hand::HandRank;
    use omikuji_core::{Fortune, GameEvent};

    #[test]
    fn tally_counts_each_event_kind() {
        let card = Card::joker(JokerColor::Black);
        let mut tally = Tally::default();
        tally.absorb(vec![
            GameEvent::CardPlaced { column: 0, card, auto: false },
            GameEvent::CardPlaced { column: 1, card, auto: true },
            GameEvent::HandCompleted { column: 1, rank: HandRank::Pair },
            GameEvent::HandCompleted { column: 2, rank: HandRank::Pair },
            GameEvent::CancelUsed { cancels_left: 2, rolled_back: true },
            GameEvent::CancelUsed { cancels_left: 1, rolled_back: false },
            GameEvent::LevelChanged { level: 2 },
            GameEvent::LevelChanged { level: 1 },
            GameEvent::FortuneDrawn { fortune: Fortune::Kichi },
            GameEvent::WinFanfare,
        ]);

        assert_eq!(tally.manual_placements, 1);
        assert_eq!(tally.auto_placements, 1);
        assert_eq!(tally.hands.get("pair"), Some(&2));
        assert_eq!(tally.cancels_used, 2);
        assert_eq!(tally.rollbacks, 1);
        assert_eq!(tally.levels_cleared, 1);
        assert_eq!(tally.fortunes, vec![Fortune::Kichi]);
    }

    #[test]
    fn endings_serialize_in_snake_case() {
        let json = serde_json::to_string(&GameEnding::TickLimit).expect("serialize");
        assert_eq!(json, "\"tick_limit\"");
    }
}
