//! Transfer Receiving Library
//!
//! Reconciliation engine for receiving inventory transfers: serialized unit
//! tracking, two-phase confirmation of destructive edits, shortage
//! detection, and receipt finalization.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod reconcile;
pub mod services;
pub mod transport;

pub use errors::ReceivingError;
pub use services::receiving::ReceivingSession;

pub mod prelude {
    pub use crate::config::{init_tracing, load_config, ReceivingConfig};
    pub use crate::errors::ReceivingError;
    pub use crate::events::{Event, EventSender};
    pub use crate::models::{
        ProductRef, ReceiptLine, ReceiptPayload, ReceivingLineState, SerialNumberEntry,
        SerialRecord, SerialStatus, Transfer, TransferLine,
    };
    // models and reconcile both own a module named `serial`; explicit
    // re-exports keep the prelude unambiguous.
    pub use crate::reconcile::{
        FinalizeOutcome, MissingPreview, PendingAction, Proposal, ShortagePreview,
    };
    pub use crate::services::{
        submit_receipt, EditOutcome, LineReceiptProgress, ReceiptProgress, ReceiptProgressStatus,
        ReceivingSession,
    };
    pub use crate::transport::{
        InMemoryReceiptSubmitter, InMemoryTransferSource, ReceiptSubmitter, SubmissionAck,
        TransferSource, TransportError,
    };
}
