pub mod receiving;

pub use receiving::{
    submit_receipt, EditOutcome, LineReceiptProgress, ReceiptProgress, ReceiptProgressStatus,
    ReceivingSession,
};
