use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::serial::{SerialRecord, SerialStatus};
use super::transfer::{ProductRef, TransferLine};

/// Working state for one transfer line during a receiving session.
///
/// Created once at session start with the full-receipt default and rewritten
/// only by the reconcilers. The roster never grows or shrinks; units are only
/// reclassified between received and missing. Fields are private so every
/// mutation path funnels through the crate-internal setters, which keep the
/// received quantity of a serial-tracked line locked to the count of
/// non-missing roster units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingLineState {
    line_id: Uuid,
    product: ProductRef,
    expected_quantity: i32,
    serial_roster: Vec<SerialRecord>,
    /// Ids currently classified missing, in the order they were flagged
    /// (most recent last). Doubles as the restore stack.
    missing_serials: Vec<Uuid>,
    received_quantity: i32,
}

impl ReceivingLineState {
    /// Builds the full-receipt default for a line: every rostered unit
    /// received, or the expected quantity for bulk lines.
    pub fn from_line(line: &TransferLine) -> Self {
        let received = if line.is_serial_tracked() {
            line.serial_roster.len() as i32
        } else {
            line.expected_quantity
        };
        Self {
            line_id: line.id,
            product: line.product.clone(),
            expected_quantity: line.expected_quantity,
            serial_roster: line.serial_roster.clone(),
            missing_serials: Vec::new(),
            received_quantity: received,
        }
    }

    pub fn line_id(&self) -> Uuid {
        self.line_id
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn expected_quantity(&self) -> i32 {
        self.expected_quantity
    }

    pub fn serial_roster(&self) -> &[SerialRecord] {
        &self.serial_roster
    }

    /// Ids currently flagged missing, oldest flag first.
    pub fn missing_serials(&self) -> &[Uuid] {
        &self.missing_serials
    }

    /// The quantity the receipt will carry for this line as things stand.
    pub fn received_quantity(&self) -> i32 {
        self.received_quantity
    }

    pub fn has_serials(&self) -> bool {
        !self.serial_roster.is_empty()
    }

    pub fn roster_size(&self) -> i32 {
        self.serial_roster.len() as i32
    }

    pub fn on_roster(&self, serial_id: Uuid) -> bool {
        self.serial_roster.iter().any(|s| s.id == serial_id)
    }

    pub fn is_missing(&self, serial_id: Uuid) -> bool {
        self.missing_serials.contains(&serial_id)
    }

    /// Current classification of a rostered unit, or `None` when the id is
    /// not on this line at all.
    pub fn serial_status(&self, serial_id: Uuid) -> Option<SerialStatus> {
        if !self.on_roster(serial_id) {
            return None;
        }
        if self.is_missing(serial_id) {
            Some(SerialStatus::Missing)
        } else {
            Some(SerialStatus::Received)
        }
    }

    /// Roster units not currently flagged missing.
    pub fn non_missing_count(&self) -> i32 {
        self.roster_size() - self.missing_serials.len() as i32
    }

    pub(crate) fn set_received_quantity(&mut self, quantity: i32) {
        self.received_quantity = quantity;
    }

    /// Flags a unit missing. Already-flagged units are left where they sit
    /// in the restore stack.
    pub(crate) fn push_missing(&mut self, serial_id: Uuid) {
        if !self.is_missing(serial_id) {
            self.missing_serials.push(serial_id);
        }
    }

    /// Restores the most recently flagged unit.
    pub(crate) fn pop_missing(&mut self) -> Option<Uuid> {
        self.missing_serials.pop()
    }

    /// Restores one specific unit. Returns false when it was not flagged.
    pub(crate) fn remove_missing(&mut self, serial_id: Uuid) -> bool {
        match self.missing_serials.iter().position(|id| *id == serial_id) {
            Some(index) => {
                self.missing_serials.remove(index);
                true
            }
            None => false,
        }
    }

    /// Re-derives the received quantity from the roster classification.
    /// Bulk lines keep whatever was set directly.
    pub(crate) fn sync_received_from_roster(&mut self) {
        if self.has_serials() {
            self.received_quantity = self.non_missing_count();
        }
    }

    /// Serial-tracked lines must show exactly their non-missing unit count.
    #[cfg(test)]
    pub(crate) fn holds_quantity_invariant(&self) -> bool {
        !self.has_serials() || self.received_quantity == self.non_missing_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rostered_line(expected: i32, names: &[&str]) -> TransferLine {
        TransferLine {
            id: Uuid::new_v4(),
            product: ProductRef {
                pricelist_id: Uuid::new_v4(),
                receiver_pricelist_id: Uuid::new_v4(),
                name: "Router".to_string(),
            },
            expected_quantity: expected,
            serial_roster: names
                .iter()
                .map(|name| SerialRecord::new(Uuid::new_v4(), *name))
                .collect(),
        }
    }

    #[test]
    fn serial_line_defaults_to_full_receipt() {
        let line = rostered_line(3, &["S1", "S2", "S3"]);
        let state = ReceivingLineState::from_line(&line);

        assert_eq!(state.received_quantity(), 3);
        assert!(state.missing_serials().is_empty());
        assert!(state.holds_quantity_invariant());
    }

    #[test]
    fn bulk_line_defaults_to_expected_quantity() {
        let line = rostered_line(7, &[]);
        let state = ReceivingLineState::from_line(&line);

        assert_eq!(state.received_quantity(), 7);
        assert!(!state.has_serials());
    }

    #[test]
    fn roster_larger_than_expected_defaults_to_roster_size() {
        // Source shipped more numbered units than the paperwork says.
        let line = rostered_line(2, &["S1", "S2", "S3"]);
        let state = ReceivingLineState::from_line(&line);

        assert_eq!(state.received_quantity(), 3);
    }

    #[test]
    fn push_and_pop_behave_as_a_stack() {
        let line = rostered_line(3, &["S1", "S2", "S3"]);
        let mut state = ReceivingLineState::from_line(&line);
        let first = line.serial_roster[0].id;
        let second = line.serial_roster[1].id;

        state.push_missing(first);
        state.push_missing(second);
        state.push_missing(first); // no-op, already flagged
        state.sync_received_from_roster();

        assert_eq!(state.missing_serials(), &[first, second]);
        assert_eq!(state.received_quantity(), 1);
        assert_eq!(state.pop_missing(), Some(second));
        assert_eq!(state.pop_missing(), Some(first));
        assert_eq!(state.pop_missing(), None);
    }

    #[test]
    fn remove_missing_restores_out_of_stack_order() {
        let line = rostered_line(3, &["S1", "S2", "S3"]);
        let mut state = ReceivingLineState::from_line(&line);
        let first = line.serial_roster[0].id;
        let second = line.serial_roster[1].id;

        state.push_missing(first);
        state.push_missing(second);

        assert!(state.remove_missing(first));
        assert!(!state.remove_missing(first));
        assert_eq!(state.missing_serials(), &[second]);
    }

    #[test]
    fn serial_status_reports_classification() {
        let line = rostered_line(2, &["S1", "S2"]);
        let mut state = ReceivingLineState::from_line(&line);
        let first = line.serial_roster[0].id;

        assert_eq!(state.serial_status(first), Some(SerialStatus::Received));
        state.push_missing(first);
        assert_eq!(state.serial_status(first), Some(SerialStatus::Missing));
        assert_eq!(state.serial_status(Uuid::new_v4()), None);
    }

    #[test]
    fn sync_received_leaves_bulk_lines_alone() {
        let line = rostered_line(4, &[]);
        let mut state = ReceivingLineState::from_line(&line);

        state.set_received_quantity(2);
        state.sync_received_from_roster();

        assert_eq!(state.received_quantity(), 2);
    }
}
