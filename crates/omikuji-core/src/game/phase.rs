use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    Menu,
    Playing,
    ContinuePrompt,
    Bonus,
    GameOver,
    Won,
    Resetting,
}

/// Something that happened which may move the round to another phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    StartPressed,
    ClearedWithBonus,
    ClearedWithoutBonus,
    BoardFullLost,
    ContinueAccepted,
    ContinueDeclined,
    BonusResolved,
    WinSettled,
    ResetComplete { to_menu: bool },
    ReturnToMenu,
}

impl RoundPhase {
    /// The transition table. `None` means the trigger does not apply here.
    pub const fn next(self, trigger: Trigger) -> Option<RoundPhase> {
        use RoundPhase::*;
        use Trigger::*;
        match (self, trigger) {
            (Menu, StartPressed) => Some(Playing),
            (Playing, ClearedWithBonus) => Some(Bonus),
            (Playing, ClearedWithoutBonus) => Some(Won),
            (Playing, BoardFullLost) => Some(ContinuePrompt),
            (ContinuePrompt, ContinueDeclined) => Some(GameOver),
            (ContinuePrompt, ContinueAccepted) => Some(Bonus),
            (Bonus, BonusResolved) => Some(Resetting),
            (Won, WinSettled) => Some(Resetting),
            (Resetting, ResetComplete { to_menu: false }) => Some(Playing),
            (Resetting, ResetComplete { to_menu: true }) => Some(Menu),
            (GameOver, ReturnToMenu) => Some(Resetting),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RoundPhase::Menu => "menu",
            RoundPhase::Playing => "playing",
            RoundPhase::ContinuePrompt => "continue",
            RoundPhase::Bonus => "bonus",
            RoundPhase::GameOver => "game-over",
            RoundPhase::Won => "won",
            RoundPhase::Resetting => "resetting",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{RoundPhase, Trigger};

    #[test]
    fn happy_path_through_a_win() {
        let phase = RoundPhase::Menu;
        let phase = phase.next(Trigger::StartPressed).unwrap();
        assert_eq!(phase, RoundPhase::Playing);
        let phase = phase.next(Trigger::ClearedWithoutBonus).unwrap();
        assert_eq!(phase, RoundPhase::Won);
        let phase = phase.next(Trigger::WinSettled).unwrap();
        assert_eq!(phase, RoundPhase::Resetting);
        let phase = phase.next(Trigger::ResetComplete { to_menu: false }).unwrap();
        assert_eq!(phase, RoundPhase::Playing);
    }

    #[test]
    fn loss_routes_through_continue_prompt() {
        let prompt = RoundPhase::Playing.next(Trigger::BoardFullLost).unwrap();
        assert_eq!(prompt, RoundPhase::ContinuePrompt);
        assert_eq!(prompt.next(Trigger::ContinueAccepted), Some(RoundPhase::Bonus));
        let over = prompt.next(Trigger::ContinueDeclined).unwrap();
        assert_eq!(over, RoundPhase::GameOver);
        assert_eq!(over.next(Trigger::ReturnToMenu), Some(RoundPhase::Resetting));
        assert_eq!(
            RoundPhase::Resetting.next(Trigger::ResetComplete { to_menu: true }),
            Some(RoundPhase::Menu)
        );
    }

    #[test]
    fn unrelated_triggers_are_rejected() {
        assert_eq!(RoundPhase::Menu.next(Trigger::BonusResolved), None);
        assert_eq!(RoundPhase::Playing.next(Trigger::StartPressed), None);
        assert_eq!(RoundPhase::GameOver.next(Trigger::ContinueAccepted), None);
        assert_eq!(RoundPhase::Bonus.next(Trigger::ReturnToMenu), None);
    }
}
