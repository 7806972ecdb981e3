//! Pure state transitions for the receiving workflow.
//!
//! Every operator edit flows through one of two reconcilers. A safe edit
//! produces a fresh [`ReceivingLineState`] immediately; an edit that would
//! flag previously received serials as missing produces a [`PendingAction`]
//! that must be confirmed or cancelled before the session accepts anything
//! else. Nothing in this module touches session state or performs I/O, so
//! every transition can be tested as a plain function call.

pub mod finalize;
pub mod pending;
pub mod quantity;
pub mod serial;

pub use finalize::{detect_shortages, finalize, finalize_with_shortages};
pub use finalize::{FinalizeOutcome, ShortagePreview};
pub use pending::{MissingPreview, PendingAction, PendingActionBuffer};
pub use quantity::propose_quantity;
pub use serial::propose_toggle;

use uuid::Uuid;

use crate::models::ReceivingLineState;

/// Result of proposing one edit against one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    /// The edit was safe and the new line state applies immediately.
    Applied(ReceivingLineState),
    /// The edit is destructive. `speculative` is what the form should
    /// display while the confirmation dialog is open; the authoritative
    /// classification stays untouched until the action is confirmed.
    RequiresConfirmation {
        speculative: ReceivingLineState,
        action: PendingAction,
    },
}

/// Selects which units a bulk reduction flags: the last `count` non-missing
/// serials in roster order, returned tail-first. Units near the end of the
/// shipping document are the ones counted last, so they are the first
/// suspects when fewer units arrived than were listed.
pub(crate) fn auto_flag_candidates(state: &ReceivingLineState, count: usize) -> Vec<Uuid> {
    state
        .serial_roster()
        .iter()
        .rev()
        .filter(|serial| !state.is_missing(serial.id))
        .take(count)
        .map(|serial| serial.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductRef, SerialRecord, TransferLine};

    fn state_with_roster(names: &[&str]) -> ReceivingLineState {
        let line = TransferLine {
            id: Uuid::new_v4(),
            product: ProductRef {
                pricelist_id: Uuid::new_v4(),
                receiver_pricelist_id: Uuid::new_v4(),
                name: "Scanner".to_string(),
            },
            expected_quantity: names.len() as i32,
            serial_roster: names
                .iter()
                .map(|name| SerialRecord::new(Uuid::new_v4(), *name))
                .collect(),
        };
        ReceivingLineState::from_line(&line)
    }

    #[test]
    fn candidates_come_from_the_roster_tail() {
        let state = state_with_roster(&["S1", "S2", "S3"]);
        let roster = state.serial_roster().to_vec();

        let picked = auto_flag_candidates(&state, 2);

        assert_eq!(picked, vec![roster[2].id, roster[1].id]);
    }

    #[test]
    fn candidates_skip_units_already_missing() {
        let mut state = state_with_roster(&["S1", "S2", "S3"]);
        let roster = state.serial_roster().to_vec();
        state.push_missing(roster[2].id);

        let picked = auto_flag_candidates(&state, 1);

        assert_eq!(picked, vec![roster[1].id]);
    }

    #[test]
    fn candidate_count_saturates_at_available_units() {
        let state = state_with_roster(&["S1", "S2"]);

        let picked = auto_flag_candidates(&state, 10);

        assert_eq!(picked.len(), 2);
    }
}
