use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::serial::SerialRecord;

/// Product identity for one transfer line, carried through unchanged onto
/// the finalized receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Catalog identifier on the sending side.
    pub pricelist_id: Uuid,

    /// Catalog identifier on the receiving side.
    pub receiver_pricelist_id: Uuid,

    /// Display name for operator-facing screens and logs.
    pub name: String,
}

/// One expected item on an inbound transfer.
///
/// A line is serial tracked exactly when its roster is non-empty. For bulk
/// lines the roster stays empty and only `expected_quantity` matters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TransferLine {
    pub id: Uuid,

    pub product: ProductRef,

    /// How many units the source location says it shipped.
    #[validate(range(min = 0, message = "Expected quantity cannot be negative"))]
    pub expected_quantity: i32,

    /// Individually numbered units on this line, in shipping-document order.
    #[validate(custom = "validate_serial_roster")]
    pub serial_roster: Vec<SerialRecord>,
}

impl TransferLine {
    pub fn is_serial_tracked(&self) -> bool {
        !self.serial_roster.is_empty()
    }
}

fn validate_serial_roster(roster: &[SerialRecord]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(roster.len());
    for serial in roster {
        if serial.name.trim().is_empty() {
            return Err(ValidationError::new("Serial name cannot be empty"));
        }
        if !seen.insert(serial.id) {
            return Err(ValidationError::new(
                "Serial ids must be unique within a line",
            ));
        }
    }
    Ok(())
}

/// An inbound transfer due at the receiving location. One transfer is the
/// unit of work for a whole receiving session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Transfer {
    pub id: Uuid,

    pub from_location_id: Uuid,

    pub to_location_id: Uuid,

    #[validate(length(min = 1, message = "Transfer must carry at least one line"))]
    pub lines: Vec<TransferLine>,
}
