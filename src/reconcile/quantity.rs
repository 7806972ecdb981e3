use tracing::debug;

use crate::models::ReceivingLineState;

use super::{PendingAction, Proposal};

/// Clamps an operator-typed quantity into the acceptable range for a line.
/// Typing is transient, so out-of-range values are corrected rather than
/// rejected.
fn clamp_requested(state: &ReceivingLineState, requested: i32) -> i32 {
    requested.clamp(0, state.expected_quantity())
}

/// Reconciles a requested received quantity against one line.
///
/// Bulk lines take the clamped value directly. Serial-tracked lines compare
/// the clamped value with the count of non-missing units: raising it
/// restores the most recently flagged units, lowering it would flag units
/// missing and therefore comes back as a [`PendingAction`] instead of a
/// state change.
pub fn propose_quantity(state: &ReceivingLineState, requested: i32) -> Proposal {
    let clamped = clamp_requested(state, requested);

    if !state.has_serials() {
        let mut next = state.clone();
        next.set_received_quantity(clamped);
        return Proposal::Applied(next);
    }

    let current = state.non_missing_count();

    if clamped == current {
        debug!(line_id = %state.line_id(), clamped, "Quantity unchanged after clamping");
        return Proposal::Applied(state.clone());
    }

    if clamped > current {
        // Restoring previously flagged units is never destructive. Most
        // recently flagged come back first, until the target is met or the
        // missing set runs dry.
        let mut next = state.clone();
        let mut remaining = clamped - current;
        while remaining > 0 && next.pop_missing().is_some() {
            remaining -= 1;
        }
        next.sync_received_from_roster();
        return Proposal::Applied(next);
    }

    // Lowering the count means some received units go missing. Park the
    // reduction for confirmation; the speculative state shows the target
    // quantity while the roster classification stays untouched.
    let mut speculative = state.clone();
    speculative.set_received_quantity(clamped);
    Proposal::RequiresConfirmation {
        speculative,
        action: PendingAction::QuantityReduction {
            line_id: state.line_id(),
            target_received_quantity: clamped,
        },
    }
}
