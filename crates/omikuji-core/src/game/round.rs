use crate::game::autoplay::{AutoCommit, auto_commit};
use crate::game::bonus::{BonusBranch, BonusDraw, Fortune, RngBonusDraw};
use crate::game::cancel::{CancelOutcome, cancel};
use crate::game::context::{MoveError, PendingCard, Placement, PlayContext};
use crate::game::events::GameEvent;
use crate::game::layout::{Control, Layout};
use crate::game::phase::{RoundPhase, Trigger};
use crate::game::rules::RoundRules;
use crate::model::board::Board;
use crate::model::deck::Deck;
use crate::model::score::{Score, ScoreEntry, ScoreTable};
use crate::numeral;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

/// Why the omikuji is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusOrigin {
    Cleared,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BonusRound {
    origin: BonusOrigin,
    ticks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetKind {
    KeepLevel,
    NewGame { to_menu: bool },
}

/// Owns one game from the menu onwards. The host calls [`RoundMachine::advance`]
/// once per frame and forwards clicks; side effects come back through
/// [`RoundMachine::drain_events`].
pub struct RoundMachine {
    rules: RoundRules,
    phase: RoundPhase,
    ctx: PlayContext,
    level: u32,
    frame: u64,
    bonus: Option<BonusRound>,
    last_fortune: Option<Fortune>,
    layout: Layout,
    score_table: ScoreTable,
    events: Vec<GameEvent>,
    rng: StdRng,
    draw: Box<dyn BonusDraw>,
    seed: u64,
}

impl RoundMachine {
    pub fn new(rules: RoundRules) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(rules, seed)
    }

    pub fn with_seed(rules: RoundRules, seed: u64) -> Self {
        let draw = RngBonusDraw::with_seed(seed.wrapping_add(1));
        Self::with_draw(rules, seed, Box::new(draw))
    }

    /// Deck shuffles follow `seed`; bonus outcomes come from `draw`.
    pub fn with_draw(rules: RoundRules, seed: u64, draw: Box<dyn BonusDraw>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::deal(&Deck::shuffled(&mut rng));
        let ctx = PlayContext::new(board, Score::new(rules.score), &rules);
        Self {
            rules,
            phase: RoundPhase::Menu,
            ctx,
            level: 1,
            frame: 0,
            bonus: None,
            last_fortune: None,
            layout: Layout::default(),
            score_table: ScoreTable::new(),
            events: Vec::new(),
            rng,
            draw,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rules(&self) -> &RoundRules {
        &self.rules
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_label(&self) -> String {
        format!("{}面", numeral::to_kanji(self.level))
    }

    pub fn context(&self) -> &PlayContext {
        &self.ctx
    }

    pub fn cancels_left(&self) -> u8 {
        self.ctx.cancels_left()
    }

    pub fn pending(&self) -> Option<PendingCard> {
        self.ctx.pending()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_fortune(&self) -> Option<Fortune> {
        self.last_fortune
    }

    pub fn score_table(&self) -> &ScoreTable {
        &self.score_table
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Layout::new(width, height);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// One frame of the host loop.
    pub fn advance(&mut self) {
        match self.phase {
            RoundPhase::Playing => self.advance_playing(),
            RoundPhase::Bonus => self.advance_bonus(),
            RoundPhase::Won => {
                if self.transition(Trigger::WinSettled) {
                    self.reset(ResetKind::KeepLevel);
                }
            }
            RoundPhase::Menu
            | RoundPhase::ContinuePrompt
            | RoundPhase::GameOver
            | RoundPhase::Resetting => {}
        }
    }

    fn advance_playing(&mut self) {
        self.frame += 1;

        if self.ctx.timer.is_expired() {
            if let AutoCommit::Placed(placement) = auto_commit(&mut self.ctx) {
                self.announce_placement(placement, true);
            }
        }

        if self.frame % u64::from(self.rules.ticks_per_second.max(1)) == 0 {
            self.ctx.timer.tick_down();
        }

        if self.ctx.board.is_full() {
            self.finish_board();
        }
    }

    fn finish_board(&mut self) {
        if !self.ctx.score.is_win() {
            if self.transition(Trigger::BoardFullLost) {
                self.events.push(GameEvent::ContinueJingle);
            }
            return;
        }

        self.level += 1;
        self.ctx.score.extend();
        self.ctx.score.set_clear_point(self.level);
        info!(level = self.level, total = self.ctx.score.total_score(), "level cleared");
        self.events.push(GameEvent::LevelChanged { level: self.level });

        match self.draw.branch() {
            BonusBranch::NoBonus => {
                let cancels_left = self.ctx.cancels_left;
                self.ctx.score.update_total_score(cancels_left, 0);
                if self.transition(Trigger::ClearedWithoutBonus) {
                    self.events.push(GameEvent::WinFanfare);
                }
            }
            BonusBranch::Omikuji => self.begin_bonus(BonusOrigin::Cleared, Trigger::ClearedWithBonus),
        }
    }

    fn begin_bonus(&mut self, origin: BonusOrigin, trigger: Trigger) {
        if self.transition(trigger) {
            self.bonus = Some(BonusRound { origin, ticks: 0 });
            self.events.push(GameEvent::OmikujiSpin);
        }
    }

    fn advance_bonus(&mut self) {
        let Some(bonus) = self.bonus.as_mut() else {
            warn!("bonus phase without a bonus round");
            return;
        };
        bonus.ticks += 1;
        if bonus.ticks >= self.rules.bonus_spin_ticks {
            self.resolve_bonus();
        }
    }

    /// Stops the omikuji spin early.
    pub fn skip_bonus(&mut self) {
        if self.phase == RoundPhase::Bonus {
            self.resolve_bonus();
        }
    }

    fn resolve_bonus(&mut self) {
        let Some(bonus) = self.bonus.take() else {
            return;
        };
        let fortune = self.draw.fortune();
        self.last_fortune = Some(fortune);
        self.events.push(GameEvent::FortuneDrawn { fortune });
        info!(%fortune, origin = ?bonus.origin, "omikuji drawn");

        let kind = match bonus.origin {
            BonusOrigin::Cleared => {
                let cancels_left = self.ctx.cancels_left;
                self.ctx
                    .score
                    .update_total_score(cancels_left, fortune.bonus_points());
                ResetKind::KeepLevel
            }
            BonusOrigin::Continue if fortune.is_misfortune() => {
                self.record_final_score();
                ResetKind::NewGame { to_menu: false }
            }
            BonusOrigin::Continue => {
                self.ctx.score.update_total_score(0, fortune.bonus_points());
                ResetKind::KeepLevel
            }
        };

        if self.transition(Trigger::BonusResolved) {
            self.reset(kind);
        }
    }

    pub fn start(&mut self) -> bool {
        if !self.request(Trigger::StartPressed) {
            return false;
        }
        self.events.push(GameEvent::ThemeStarted);
        true
    }

    pub fn accept_continue(&mut self) -> bool {
        if self.phase != RoundPhase::ContinuePrompt {
            warn!(phase = %self.phase, "continue accepted outside the continue prompt");
            return false;
        }
        self.begin_bonus(BonusOrigin::Continue, Trigger::ContinueAccepted);
        true
    }

    pub fn decline_continue(&mut self) -> bool {
        if !self.request(Trigger::ContinueDeclined) {
            return false;
        }
        self.record_final_score();
        self.events.push(GameEvent::GameOverJingle);
        true
    }

    pub fn return_to_menu(&mut self) -> bool {
        if !self.request(Trigger::ReturnToMenu) {
            return false;
        }
        self.reset(ResetKind::NewGame { to_menu: true });
        true
    }

    pub fn select_group(&mut self, group: usize) -> Result<PendingCard, MoveError> {
        if self.phase != RoundPhase::Playing {
            return Err(MoveError::NotPlaying);
        }
        let pending = self.ctx.select(group)?;
        self.events.push(GameEvent::CardSelected {
            group,
            card: pending.card,
        });
        Ok(pending)
    }

    pub fn place_in_column(&mut self, column: usize) -> Result<Placement, MoveError> {
        if self.phase != RoundPhase::Playing {
            return Err(MoveError::NotPlaying);
        }
        let placement = self.ctx.place_pending(column)?;
        self.announce_placement(placement, false);
        Ok(placement)
    }

    pub fn cancel(&mut self) -> CancelOutcome {
        if self.phase != RoundPhase::Playing {
            return CancelOutcome::Rejected;
        }
        let outcome = cancel(&mut self.ctx);
        if outcome.consumed_budget() {
            self.events.push(GameEvent::CancelUsed {
                cancels_left: self.ctx.cancels_left,
                rolled_back: outcome == CancelOutcome::RolledBack,
            });
        }
        outcome
    }

    /// Cancel only when the click lands on the cancel control.
    pub fn activate_cancel_control(&mut self, x: f32, y: f32) -> Option<CancelOutcome> {
        self.layout.cancel().contains(x, y).then(|| self.cancel())
    }

    /// Routes a click to whatever control the current phase shows under it.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<Control> {
        let control = self.layout.hit(self.phase, x, y)?;
        match control {
            Control::Start => {
                self.start();
            }
            Control::Cancel => {
                self.cancel();
            }
            Control::Group(group) => {
                if let Err(err) = self.select_group(group) {
                    debug!(?err, group, "selection ignored");
                }
            }
            Control::Column(column) => {
                if let Err(err) = self.place_in_column(column) {
                    debug!(?err, column, "placement ignored");
                }
            }
            Control::ContinueYes => {
                self.accept_continue();
            }
            Control::ContinueNo => {
                self.decline_continue();
            }
            Control::Menu => {
                self.return_to_menu();
            }
        }
        Some(control)
    }

    fn announce_placement(&mut self, placement: Placement, auto: bool) {
        self.events.push(GameEvent::CardPlaced {
            column: placement.column,
            card: placement.card,
            auto,
        });
        if let Some(rank) = placement.rank {
            debug!(column = placement.column, %rank, "column completed");
            self.events.push(GameEvent::HandCompleted {
                column: placement.column,
                rank,
            });
        }
    }

    fn record_final_score(&mut self) {
        let entry = ScoreEntry {
            level: self.level,
            total: self.ctx.score.total_score(),
        };
        let placement = self.score_table.record(entry);
        info!(level = entry.level, total = entry.total, ?placement, "game over");
    }

    /// A transition asked for by the host. Rejections mean the host offered a
    /// control the current phase does not show.
    fn request(&mut self, trigger: Trigger) -> bool {
        if self.phase.next(trigger).is_none() {
            warn!(phase = %self.phase, ?trigger, "host request rejected");
            return false;
        }
        self.transition(trigger)
    }

    fn transition(&mut self, trigger: Trigger) -> bool {
        match self.phase.next(trigger) {
            Some(next) => {
                debug!(from = %self.phase, to = %next, ?trigger, "phase change");
                self.events.push(GameEvent::PhaseChanged {
                    from: self.phase,
                    to: next,
                });
                self.phase = next;
                true
            }
            None => {
                debug!(phase = %self.phase, ?trigger, "trigger ignored");
                false
            }
        }
    }

    /// Runs the whole `Resetting` phase: reshuffles the display groups and
    /// starts a fresh round with a full cancel budget.
    fn reset(&mut self, kind: ResetKind) {
        let mut groups = self.ctx.board.groups().clone();
        for group in groups.iter_mut() {
            group.shuffle(&mut self.rng);
        }

        let mut score = self.ctx.score.clone();
        let to_menu = match kind {
            ResetKind::KeepLevel => {
                score.reset_round();
                false
            }
            ResetKind::NewGame { to_menu } => {
                self.level = 1;
                score.reset_all();
                self.events.push(GameEvent::LevelChanged { level: 1 });
                to_menu
            }
        };
        score.set_clear_point(self.level);

        self.ctx = PlayContext::new(Board::with_groups(groups), score, &self.rules);
        self.frame = 0;
        self.bonus = None;
        self.transition(Trigger::ResetComplete { to_menu });
    }
}

impl std::fmt::Debug for RoundMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundMachine")
            .field("phase", &self.phase)
            .field("level", &self.level)
            .field("frame", &self.frame)
            .field("cancels_left", &self.ctx.cancels_left)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::RoundMachine;
    use crate::game::bonus::{BonusBranch, Fortune, ScriptedBonusDraw};
    use crate::game::cancel::CancelOutcome;
    use crate::game::context::MoveError;
    use crate::game::events::GameEvent;
    use crate::game::phase::RoundPhase;
    use crate::game::rules::RoundRules;

    fn machine(branches: Vec<BonusBranch>, fortunes: Vec<Fortune>) -> RoundMachine {
        let draw = ScriptedBonusDraw::new(branches, fortunes);
        RoundMachine::with_draw(RoundRules::default(), 17, Box::new(draw))
    }

    #[test]
    fn starts_in_menu_and_ignores_moves() {
        let mut game = machine(vec![], vec![]);
        assert_eq!(game.phase(), RoundPhase::Menu);
        assert_eq!(game.select_group(0), Err(MoveError::NotPlaying));
        assert_eq!(game.cancel(), CancelOutcome::Rejected);
        game.advance();
        assert_eq!(game.frame(), 0);
        assert!(game.start());
        assert_eq!(game.phase(), RoundPhase::Playing);
        assert!(!game.start());
    }

    #[test]
    fn countdown_ticks_once_per_second_of_frames() {
        let mut game = machine(vec![], vec![]);
        game.start();
        for _ in 0..59 {
            game.advance();
        }
        assert_eq!(game.context().timer().seconds_remaining(), 10);
        game.advance();
        assert_eq!(game.context().timer().seconds_remaining(), 9);
    }

    #[test]
    fn expired_countdown_places_a_card() {
        let mut game = machine(vec![], vec![]);
        game.start();
        for _ in 0..600 {
            game.advance();
        }
        assert!(game.context().board().is_empty());
        game.advance();
        assert!(!game.context().board().is_empty());
        assert_eq!(game.context().history().len(), 2);
        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::CardPlaced { auto: true, .. })));
    }

    #[test]
    fn level_label_uses_kanji() {
        let game = machine(vec![], vec![]);
        assert_eq!(game.level_label(), "一面");
    }

    #[test]
    fn click_on_start_button_begins_play() {
        let mut game = machine(vec![], vec![]);
        let start = game.layout().start();
        game.select_at(start.x + 1.0, start.y + 1.0);
        assert_eq!(game.phase(), RoundPhase::Playing);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn starting_play_cues_the_theme_once() {
        let mut game = machine(vec![], vec![]);
        assert!(game.start());
        assert!(!game.start());
        let themes = game
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::ThemeStarted)
            .count();
        assert_eq!(themes, 1);
    }

    #[test]
    fn misplaced_host_requests_log_warnings() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut game = machine(vec![], vec![]);
            assert!(!game.decline_continue());
            assert!(!game.return_to_menu());
            assert!(!game.accept_continue());
            assert_eq!(game.phase(), RoundPhase::Menu);
        });

        let text = log.text();
        assert_eq!(text.matches("WARN").count(), 3, "{text}");
        assert!(text.contains("host request rejected"), "{text}");
    }

    #[test]
    fn frame_driven_rejections_stay_quiet() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut game = machine(vec![], vec![]);
            game.start();
            for _ in 0..120 {
                game.advance();
            }
        });

        assert!(log.text().is_empty(), "{}", log.text());
    }
}
