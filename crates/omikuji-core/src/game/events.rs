use crate::game::bonus::Fortune;
use crate::game::phase::RoundPhase;
use crate::model::card::Card;
use crate::model::hand::HandRank;
use serde::Serialize;

/// Side effects the host renders or plays; the core only queues them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { from: RoundPhase, to: RoundPhase },
    /// Play began from the menu; the host starts the game theme.
    ThemeStarted,
    CardSelected { group: usize, card: Card },
    CardPlaced { column: usize, card: Card, auto: bool },
    HandCompleted { column: usize, rank: HandRank },
    CancelUsed { cancels_left: u8, rolled_back: bool },
    LevelChanged { level: u32 },
    OmikujiSpin,
    FortuneDrawn { fortune: Fortune },
    ContinueJingle,
    WinFanfare,
    GameOverJingle,
}
