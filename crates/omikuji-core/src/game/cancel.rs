use crate::game::context::PlayContext;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The pending card went back to its display group.
    Unselected,
    /// Board and score were restored one move back.
    RolledBack,
    /// No cancels left, or the round is not accepting input.
    Rejected,
    /// Nothing pending and nothing to roll back to.
    NothingToCancel,
}

impl CancelOutcome {
    pub const fn consumed_budget(self) -> bool {
        matches!(self, CancelOutcome::Unselected | CancelOutcome::RolledBack)
    }
}

/// Spends one cancel to drop the pending pick or undo the last committed move.
pub fn cancel(ctx: &mut PlayContext) -> CancelOutcome {
    if ctx.cancels_left == 0 {
        return CancelOutcome::Rejected;
    }

    if ctx.pending.take().is_some() {
        ctx.timer.reset();
        ctx.cancels_left -= 1;
        debug!(cancels_left = ctx.cancels_left, "pending card returned");
        return CancelOutcome::Unselected;
    }

    if ctx.board.is_empty() {
        return CancelOutcome::NothingToCancel;
    }

    let Some(snapshot) = ctx.history.rewind() else {
        return CancelOutcome::NothingToCancel;
    };
    ctx.restore(&snapshot);
    ctx.history.record(snapshot);
    ctx.timer.reset();
    ctx.cancels_left -= 1;
    debug!(
        cancels_left = ctx.cancels_left,
        score = ctx.score.current_score(),
        "rolled back one move"
    );
    CancelOutcome::RolledBack
}
