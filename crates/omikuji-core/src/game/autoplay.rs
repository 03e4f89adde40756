use crate::game::context::{Placement, PlayContext};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCommit {
    Placed(Placement),
    Stalled,
}

/// Runs when the countdown reaches zero. Places the pending card, or failing
/// that the first available display card, in the first column that takes it.
/// The countdown restarts whether or not anything was placed.
pub fn auto_commit(ctx: &mut PlayContext) -> AutoCommit {
    let candidate = ctx
        .pending
        .map(|pending| (pending.group, pending.card))
        .or_else(|| ctx.board.first_pending_card());

    let outcome = match candidate {
        Some((group, card)) => (0..ctx.board.column_count())
            .find_map(|column| ctx.commit(group, card, column).ok())
            .map_or(AutoCommit::Stalled, AutoCommit::Placed),
        None => AutoCommit::Stalled,
    };

    ctx.timer.reset();
    match outcome {
        AutoCommit::Placed(placement) => {
            debug!(column = placement.column, card = %placement.card, "countdown placed card");
        }
        AutoCommit::Stalled => debug!("countdown expired with no legal placement"),
    }
    outcome
}
