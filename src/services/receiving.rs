use std::collections::HashSet;

use metrics::counter;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ReceivingError,
    events::{Event, EventSender},
    models::{ReceiptPayload, ReceivingLineState, Transfer},
    reconcile::{
        self, FinalizeOutcome, MissingPreview, PendingAction, PendingActionBuffer, Proposal,
    },
    transport::{ReceiptSubmitter, SubmissionAck, TransferSource},
};

/// What a proposed edit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was safe and has been applied.
    Applied,
    /// The edit was destructive and is parked pending confirmation. The
    /// preview itemizes what a confirm would flag, for the warning dialog.
    ConfirmationRequired(MissingPreview),
}

/// Receipt progress classification for one line or a whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptProgressStatus {
    NotReceived,
    PartiallyReceived,
    FullyReceived,
    OverReceived,
}

/// Progress of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReceiptProgress {
    pub line_id: Uuid,
    pub product_name: String,
    pub expected_quantity: i32,
    pub effective_quantity: i32,
    pub missing_count: usize,
    pub status: ReceiptProgressStatus,
}

/// Roll-up of where the session stands, for summary panels and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptProgress {
    pub total_expected: i32,
    pub total_received: i32,
    pub status: ReceiptProgressStatus,
    pub lines: Vec<LineReceiptProgress>,
}

/// Interactive state machine for receiving one inbound transfer.
///
/// The session owns the working state of every line plus the single slot
/// for a pending destructive edit. All mutation goes through
/// [`request_quantity`](Self::request_quantity),
/// [`toggle_serial`](Self::toggle_serial),
/// [`confirm_pending`](Self::confirm_pending) and
/// [`cancel_pending`](Self::cancel_pending); the embedding form renders
/// whatever the read accessors expose. Operator actions are processed one
/// at a time, so the session is deliberately synchronous and single
/// threaded.
#[derive(Debug)]
pub struct ReceivingSession {
    transfer_id: Uuid,
    lines: Vec<ReceivingLineState>,
    pending: PendingActionBuffer,
    event_sender: Option<EventSender>,
}

impl ReceivingSession {
    /// Opens a session over a transfer, defaulting every line to a full
    /// receipt: all rostered units received, bulk lines at their expected
    /// quantity.
    #[instrument(skip(transfer, event_sender), fields(transfer_id = %transfer.id))]
    pub fn initialize(
        transfer: &Transfer,
        event_sender: Option<EventSender>,
    ) -> Result<Self, ReceivingError> {
        transfer.validate()?;

        let mut seen = HashSet::with_capacity(transfer.lines.len());
        for line in &transfer.lines {
            line.validate()?;
            if !seen.insert(line.id) {
                return Err(ReceivingError::invalid_input(format!(
                    "Duplicate line id {} on transfer {}",
                    line.id, transfer.id
                )));
            }
        }

        let session = Self {
            transfer_id: transfer.id,
            lines: transfer
                .lines
                .iter()
                .map(ReceivingLineState::from_line)
                .collect(),
            pending: PendingActionBuffer::new(),
            event_sender,
        };

        session.emit(Event::SessionInitialized {
            transfer_id: session.transfer_id,
            line_count: session.lines.len(),
        });
        counter!("receiving.sessions.initialized", 1);
        info!(lines = session.lines.len(), "Receiving session initialized");
        Ok(session)
    }

    /// Fetches a transfer from the source and opens a session over it.
    pub async fn initialize_from_source(
        source: &dyn TransferSource,
        transfer_id: Uuid,
        event_sender: Option<EventSender>,
    ) -> Result<Self, ReceivingError> {
        let transfer = source
            .fetch_transfer(transfer_id)
            .await
            .map_err(|e| ReceivingError::FetchError(e.to_string()))?;
        Self::initialize(&transfer, event_sender)
    }

    pub fn transfer_id(&self) -> Uuid {
        self.transfer_id
    }

    pub fn lines(&self) -> &[ReceivingLineState] {
        &self.lines
    }

    pub fn line(&self, line_id: Uuid) -> Option<&ReceivingLineState> {
        self.lines.iter().find(|line| line.line_id() == line_id)
    }

    /// The outstanding destructive edit, if any.
    pub fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.get()
    }

    /// Itemized preview of the outstanding action, recomputed against the
    /// line it targets.
    pub fn pending_preview(&self) -> Option<MissingPreview> {
        let action = self.pending.get()?;
        let line = self.line(action.line_id())?;
        Some(action.preview(line))
    }

    /// Handles the operator typing a received quantity for a line.
    ///
    /// The value is clamped into range first. Raising the count restores
    /// flagged units and applies immediately; lowering it on a
    /// serial-tracked line comes back as
    /// [`EditOutcome::ConfirmationRequired`] with the displayed quantity
    /// moved speculatively.
    #[instrument(skip(self))]
    pub fn request_quantity(
        &mut self,
        line_id: Uuid,
        requested: i32,
    ) -> Result<EditOutcome, ReceivingError> {
        self.pending.ensure_clear()?;
        let index = self.line_index(line_id)?;

        match reconcile::propose_quantity(&self.lines[index], requested) {
            Proposal::Applied(next) => {
                let restored = restored_ids(&self.lines[index], &next);
                let previous = self.lines[index].received_quantity();
                let current = next.received_quantity();
                self.lines[index] = next;

                for serial_id in restored {
                    self.emit(Event::SerialRestored { line_id, serial_id });
                    counter!("receiving.serials.restored", 1);
                }
                if previous != current {
                    self.emit(Event::ReceivedQuantityChanged {
                        line_id,
                        previous,
                        current,
                    });
                }
                Ok(EditOutcome::Applied)
            }
            Proposal::RequiresConfirmation {
                speculative,
                action,
            } => {
                let preview = action.preview(&self.lines[index]);
                self.pending.propose(action)?;
                self.lines[index] = speculative;

                self.emit(Event::ConfirmationRequested {
                    line_id,
                    serials_at_risk: preview.serials.len(),
                });
                counter!("receiving.pending_actions.proposed", 1);
                Ok(EditOutcome::ConfirmationRequired(preview))
            }
        }
    }

    /// Handles the operator flipping one serial checkbox.
    ///
    /// `currently_missing` is the classification the operator saw when they
    /// clicked. Restores apply immediately; flagging a unit missing comes
    /// back as [`EditOutcome::ConfirmationRequired`] with nothing mutated.
    #[instrument(skip(self))]
    pub fn toggle_serial(
        &mut self,
        line_id: Uuid,
        serial_id: Uuid,
        currently_missing: bool,
    ) -> Result<EditOutcome, ReceivingError> {
        self.pending.ensure_clear()?;
        let index = self.line_index(line_id)?;

        match reconcile::propose_toggle(&self.lines[index], serial_id, currently_missing)? {
            Proposal::Applied(next) => {
                let restored =
                    self.lines[index].is_missing(serial_id) && !next.is_missing(serial_id);
                let previous = self.lines[index].received_quantity();
                let current = next.received_quantity();
                self.lines[index] = next;

                if restored {
                    self.emit(Event::SerialRestored { line_id, serial_id });
                    counter!("receiving.serials.restored", 1);
                }
                if previous != current {
                    self.emit(Event::ReceivedQuantityChanged {
                        line_id,
                        previous,
                        current,
                    });
                }
                Ok(EditOutcome::Applied)
            }
            Proposal::RequiresConfirmation {
                speculative,
                action,
            } => {
                let preview = action.preview(&self.lines[index]);
                self.pending.propose(action)?;
                self.lines[index] = speculative;

                self.emit(Event::ConfirmationRequested {
                    line_id,
                    serials_at_risk: preview.serials.len(),
                });
                counter!("receiving.pending_actions.proposed", 1);
                Ok(EditOutcome::ConfirmationRequired(preview))
            }
        }
    }

    /// Commits the outstanding destructive edit, flagging its units missing.
    #[instrument(skip(self))]
    pub fn confirm_pending(&mut self) -> Result<(), ReceivingError> {
        let action = self.pending.take()?;
        let line_id = action.line_id();
        let index = self.line_index(line_id)?;

        let preview = action.preview(&self.lines[index]);
        // The displayed value may already sit at the target speculatively;
        // the classified count is the authoritative before-value.
        let previous = self.lines[index].non_missing_count();
        let next = action.apply(&self.lines[index]);
        let current = next.received_quantity();
        self.lines[index] = next;

        for serial in &preview.serials {
            self.emit(Event::SerialMarkedMissing {
                line_id,
                serial_id: serial.id,
            });
            counter!("receiving.serials.flagged_missing", 1);
        }
        self.emit(Event::PendingConfirmed {
            line_id,
            serials_flagged: preview.serials.len(),
        });
        if previous != current {
            self.emit(Event::ReceivedQuantityChanged {
                line_id,
                previous,
                current,
            });
        }
        counter!("receiving.pending_actions.confirmed", 1);
        info!(%line_id, flagged = preview.serials.len(), "Pending action confirmed");
        Ok(())
    }

    /// Discards the outstanding destructive edit and rolls the displayed
    /// quantity back to what the untouched classification implies.
    #[instrument(skip(self))]
    pub fn cancel_pending(&mut self) -> Result<(), ReceivingError> {
        let action = self.pending.take()?;
        let line_id = action.line_id();
        let index = self.line_index(line_id)?;

        let previous = self.lines[index].received_quantity();
        let restored = action.rollback(&self.lines[index]);
        let current = restored.received_quantity();
        self.lines[index] = restored;

        self.emit(Event::PendingCancelled { line_id });
        if previous != current {
            self.emit(Event::ReceivedQuantityChanged {
                line_id,
                previous,
                current,
            });
        }
        counter!("receiving.pending_actions.cancelled", 1);
        info!(%line_id, "Pending action cancelled");
        Ok(())
    }

    /// Attempts to close the session. Fails fast while a pending action is
    /// outstanding; comes back with the shortage list when any line is
    /// short, and with the assembled payload otherwise. Read-only either
    /// way, so a blocked finalize can simply be retried.
    #[instrument(skip(self))]
    pub fn finalize(&self) -> Result<FinalizeOutcome, ReceivingError> {
        self.pending.ensure_clear()?;

        let outcome = reconcile::finalize(self.transfer_id, &self.lines);
        match &outcome {
            FinalizeOutcome::ShortagesDetected(shortages) => {
                warn!(
                    transfer_id = %self.transfer_id,
                    short_lines = shortages.len(),
                    "Finalize blocked by shortages"
                );
                for shortage in shortages {
                    self.emit(Event::ShortageDetected {
                        line_id: shortage.line_id,
                        expected_quantity: shortage.expected_quantity,
                        effective_quantity: shortage.effective_quantity,
                    });
                }
                counter!("receiving.finalize.blocked_by_shortage", 1);
            }
            FinalizeOutcome::Finalized(payload) => {
                info!(
                    transfer_id = %self.transfer_id,
                    lines = payload.lines.len(),
                    "Receipt finalized"
                );
                self.emit(Event::ReceiptFinalized {
                    transfer_id: self.transfer_id,
                    line_count: payload.lines.len(),
                    short_line_count: 0,
                });
                counter!("receiving.receipts.finalized", 1);
            }
        }
        Ok(outcome)
    }

    /// Closes the session accepting the current shortages. Meant to be
    /// called after [`finalize`](Self::finalize) came back with
    /// [`FinalizeOutcome::ShortagesDetected`] and the operator chose to
    /// proceed anyway.
    #[instrument(skip(self))]
    pub fn finalize_with_shortages(&self) -> Result<ReceiptPayload, ReceivingError> {
        self.pending.ensure_clear()?;

        let shortages = reconcile::detect_shortages(&self.lines);
        let payload = reconcile::finalize_with_shortages(self.transfer_id, &self.lines);

        info!(
            transfer_id = %self.transfer_id,
            short_lines = shortages.len(),
            "Receipt finalized with accepted shortages"
        );
        self.emit(Event::ReceiptFinalized {
            transfer_id: self.transfer_id,
            line_count: payload.lines.len(),
            short_line_count: shortages.len(),
        });
        counter!("receiving.receipts.finalized", 1);
        Ok(payload)
    }

    /// Per-line and overall receipt progress for summary panels.
    pub fn receipt_progress(&self) -> ReceiptProgress {
        let lines: Vec<LineReceiptProgress> = self
            .lines
            .iter()
            .map(|line| LineReceiptProgress {
                line_id: line.line_id(),
                product_name: line.product().name.clone(),
                expected_quantity: line.expected_quantity(),
                effective_quantity: line.received_quantity(),
                missing_count: line.missing_serials().len(),
                status: progress_status(line.expected_quantity(), line.received_quantity()),
            })
            .collect();

        let total_expected: i32 = self.lines.iter().map(|l| l.expected_quantity()).sum();
        let total_received: i32 = self.lines.iter().map(|l| l.received_quantity()).sum();

        ReceiptProgress {
            total_expected,
            total_received,
            status: progress_status(total_expected, total_received),
            lines,
        }
    }

    fn line_index(&self, line_id: Uuid) -> Result<usize, ReceivingError> {
        self.lines
            .iter()
            .position(|line| line.line_id() == line_id)
            .ok_or(ReceivingError::LineNotFound(line_id))
    }

    fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event);
        }
    }
}

/// Hands a finalized receipt to the submission collaborator.
///
/// The engine owns no retry policy; a failure maps onto
/// [`ReceivingError::SubmissionError`] for the embedding application to
/// surface.
#[instrument(skip(submitter, payload), fields(transfer_id = %payload.transfer_id))]
pub async fn submit_receipt(
    submitter: &dyn ReceiptSubmitter,
    payload: &ReceiptPayload,
) -> Result<SubmissionAck, ReceivingError> {
    let ack = submitter
        .submit(payload)
        .await
        .map_err(|e| ReceivingError::submission(e.to_string()))?;

    info!(receipt_id = %ack.receipt_id, "Receipt accepted by inventory service");
    counter!("receiving.receipts.submitted", 1);
    Ok(ack)
}

fn progress_status(expected: i32, effective: i32) -> ReceiptProgressStatus {
    if effective == 0 && expected > 0 {
        ReceiptProgressStatus::NotReceived
    } else if effective < expected {
        ReceiptProgressStatus::PartiallyReceived
    } else if effective == expected {
        ReceiptProgressStatus::FullyReceived
    } else {
        ReceiptProgressStatus::OverReceived
    }
}

/// Ids flagged in `before` that are no longer flagged in `after`.
fn restored_ids(before: &ReceivingLineState, after: &ReceivingLineState) -> Vec<Uuid> {
    before
        .missing_serials()
        .iter()
        .filter(|id| !after.is_missing(**id))
        .copied()
        .collect()
}
