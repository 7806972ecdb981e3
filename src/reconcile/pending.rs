use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ReceivingError;
use crate::models::{ReceivingLineState, SerialRecord};

use super::auto_flag_candidates;

/// A proposed-but-unconfirmed destructive edit.
///
/// At most one exists per session at any time. The authoritative line state
/// is not touched until the action is confirmed; cancelling discards it and
/// rolls the display back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// A quantity drop on a serial-tracked line. Confirming flags enough
    /// units, taken from the tail of roster order, to land on the target.
    QuantityReduction {
        line_id: Uuid,
        target_received_quantity: i32,
    },
    /// A single unit flagged missing by the operator.
    SerialMissingFlag { line_id: Uuid, serial_id: Uuid },
}

/// Itemized description of what confirming an action would flag, rendered
/// in the warning dialog before the operator commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPreview {
    pub line_id: Uuid,

    /// Received quantity the line will show after confirmation.
    pub resulting_quantity: i32,

    /// Units that would be flagged, in the order they would be flagged.
    pub serials: Vec<SerialRecord>,
}

impl PendingAction {
    /// The line this action targets.
    pub fn line_id(&self) -> Uuid {
        match self {
            Self::QuantityReduction { line_id, .. } => *line_id,
            Self::SerialMissingFlag { line_id, .. } => *line_id,
        }
    }

    /// Lists exactly which units a confirm would flag as missing, against
    /// the line state the action was proposed on.
    pub fn preview(&self, state: &ReceivingLineState) -> MissingPreview {
        let victims = self.victims(state);
        MissingPreview {
            line_id: self.line_id(),
            resulting_quantity: state.non_missing_count() - victims.len() as i32,
            serials: victims
                .iter()
                .filter_map(|id| state.serial_roster().iter().find(|s| s.id == *id))
                .cloned()
                .collect(),
        }
    }

    /// Applies the buffered mutation, producing the confirmed line state.
    pub(crate) fn apply(&self, state: &ReceivingLineState) -> ReceivingLineState {
        debug_assert_eq!(state.line_id(), self.line_id());

        let mut next = state.clone();
        for serial_id in self.victims(state) {
            next.push_missing(serial_id);
        }
        next.sync_received_from_roster();
        next
    }

    /// Discards the speculative display, restoring the quantity implied by
    /// the untouched roster classification.
    pub(crate) fn rollback(&self, state: &ReceivingLineState) -> ReceivingLineState {
        debug_assert_eq!(state.line_id(), self.line_id());

        let mut next = state.clone();
        next.sync_received_from_roster();
        next
    }

    /// Ids this action would flag, in flag order.
    fn victims(&self, state: &ReceivingLineState) -> Vec<Uuid> {
        match self {
            Self::QuantityReduction {
                target_received_quantity,
                ..
            } => {
                let count = (state.non_missing_count() - target_received_quantity).max(0) as usize;
                auto_flag_candidates(state, count)
            }
            Self::SerialMissingFlag { serial_id, .. } => {
                if state.is_missing(*serial_id) {
                    vec![]
                } else {
                    vec![*serial_id]
                }
            }
        }
    }
}

/// Holder for the single outstanding pending action of a session.
#[derive(Debug, Default, Clone)]
pub struct PendingActionBuffer {
    slot: Option<PendingAction>,
}

impl PendingActionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn get(&self) -> Option<&PendingAction> {
        self.slot.as_ref()
    }

    /// Parks a proposal. Proposing while another action is outstanding is a
    /// protocol violation by the caller.
    pub(crate) fn propose(&mut self, action: PendingAction) -> Result<(), ReceivingError> {
        if self.slot.is_some() {
            return Err(ReceivingError::PendingActionOutstanding);
        }
        self.slot = Some(action);
        Ok(())
    }

    /// Removes the outstanding action for resolution.
    pub(crate) fn take(&mut self) -> Result<PendingAction, ReceivingError> {
        self.slot.take().ok_or(ReceivingError::NoPendingAction)
    }

    /// Fails when an action is still outstanding.
    pub(crate) fn ensure_clear(&self) -> Result<(), ReceivingError> {
        if self.slot.is_some() {
            return Err(ReceivingError::PendingActionOutstanding);
        }
        Ok(())
    }
}
