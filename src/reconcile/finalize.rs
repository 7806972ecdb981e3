use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    ReceiptLine, ReceiptPayload, ReceivingLineState, SerialNumberEntry, SerialStatus,
};

/// One line that stands short of its expected quantity at finalize time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortagePreview {
    pub line_id: Uuid,
    pub product_name: String,
    pub expected_quantity: i32,
    pub effective_quantity: i32,
}

impl ShortagePreview {
    pub fn shortfall(&self) -> i32 {
        self.expected_quantity - self.effective_quantity
    }
}

/// What a finalize attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Every line met its expectation; the payload is ready to submit.
    Finalized(ReceiptPayload),
    /// One or more lines are short. No payload is built until the operator
    /// explicitly accepts the shortages.
    ShortagesDetected(Vec<ShortagePreview>),
}

/// Scans the line states for shortages, in line order.
pub fn detect_shortages(lines: &[ReceivingLineState]) -> Vec<ShortagePreview> {
    lines
        .iter()
        .filter(|line| line.received_quantity() < line.expected_quantity())
        .map(|line| ShortagePreview {
            line_id: line.line_id(),
            product_name: line.product().name.clone(),
            expected_quantity: line.expected_quantity(),
            effective_quantity: line.received_quantity(),
        })
        .collect()
}

/// Runs the shortage gate and assembles the receipt when it passes.
///
/// Pure: the same line states always produce the same outcome, and nothing
/// is consumed or mutated, so a blocked finalize can be retried after the
/// operator corrects the lines.
pub fn finalize(transfer_id: Uuid, lines: &[ReceivingLineState]) -> FinalizeOutcome {
    let shortages = detect_shortages(lines);
    if !shortages.is_empty() {
        return FinalizeOutcome::ShortagesDetected(shortages);
    }
    FinalizeOutcome::Finalized(build_payload(transfer_id, lines))
}

/// Assembles the receipt unconditionally. This is the second step of the
/// shortage protocol, taken after the operator has seen the shortage list
/// and chosen to proceed.
pub fn finalize_with_shortages(transfer_id: Uuid, lines: &[ReceivingLineState]) -> ReceiptPayload {
    build_payload(transfer_id, lines)
}

fn build_payload(transfer_id: Uuid, lines: &[ReceivingLineState]) -> ReceiptPayload {
    let lines = lines
        .iter()
        .map(|line| {
            let serial_numbers: Vec<SerialNumberEntry> = line
                .serial_roster()
                .iter()
                .map(|serial| SerialNumberEntry {
                    id: serial.id,
                    serial_name: serial.name.clone(),
                    status: if line.is_missing(serial.id) {
                        SerialStatus::Missing
                    } else {
                        SerialStatus::Received
                    },
                })
                .collect();

            ReceiptLine {
                pricelist_id: line.product().pricelist_id,
                // Serial-tracked lines report the whole roster so the
                // downstream service sees missing units alongside received
                // ones; bulk lines report the effective count.
                quantity: if line.has_serials() {
                    line.roster_size()
                } else {
                    line.received_quantity()
                },
                receiver_pricelist_id: line.product().receiver_pricelist_id,
                serial_numbers,
            }
        })
        .collect();

    ReceiptPayload { transfer_id, lines }
}
