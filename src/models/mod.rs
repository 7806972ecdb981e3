pub mod line_state;
pub mod receipt;
pub mod serial;
pub mod transfer;

pub use line_state::ReceivingLineState;
pub use receipt::{ReceiptLine, ReceiptPayload, SerialNumberEntry};
pub use serial::{SerialRecord, SerialStatus};
pub use transfer::{ProductRef, Transfer, TransferLine};
