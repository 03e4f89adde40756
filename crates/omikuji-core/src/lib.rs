#![deny(warnings)]
pub mod game;
pub mod model;
pub mod numeral;

pub use game::bonus::{BonusBranch, BonusDraw, Fortune, RngBonusDraw, ScriptedBonusDraw};
pub use game::cancel::CancelOutcome;
pub use game::events::GameEvent;
pub use game::phase::RoundPhase;
pub use game::round::RoundMachine;
pub use game::rules::RoundRules;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "omikuji-poker"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "omikuji-poker");
        assert!(!AppInfo::version().is_empty());
    }
}
