use tracing::debug;
use uuid::Uuid;

use crate::errors::ReceivingError;
use crate::models::ReceivingLineState;

use super::{PendingAction, Proposal};

/// Reconciles one serial checkbox flip against a line.
///
/// `currently_missing` is the classification the operator was looking at
/// when they clicked. Unmarking a missing unit is always safe and applies
/// immediately; marking a received unit missing is destructive and comes
/// back as a [`PendingAction`] with no state change. A stale view (the unit
/// already carries the classification being requested) degenerates to a
/// no-op rather than an error.
pub fn propose_toggle(
    state: &ReceivingLineState,
    serial_id: Uuid,
    currently_missing: bool,
) -> Result<Proposal, ReceivingError> {
    if !state.on_roster(serial_id) {
        return Err(ReceivingError::SerialNotFound {
            line_id: state.line_id(),
            serial_id,
        });
    }

    if currently_missing {
        let mut next = state.clone();
        if next.remove_missing(serial_id) {
            next.sync_received_from_roster();
        } else {
            debug!(
                line_id = %state.line_id(),
                %serial_id,
                "Serial already classified received; nothing to restore"
            );
        }
        return Ok(Proposal::Applied(next));
    }

    if state.is_missing(serial_id) {
        debug!(
            line_id = %state.line_id(),
            %serial_id,
            "Serial already flagged missing; nothing to do"
        );
        return Ok(Proposal::Applied(state.clone()));
    }

    // The flag itself waits for confirmation; nothing moves yet, so the
    // speculative view equals the current state.
    Ok(Proposal::RequiresConfirmation {
        speculative: state.clone(),
        action: PendingAction::SerialMissingFlag {
            line_id: state.line_id(),
            serial_id,
        },
    })
}
