use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of one individually tracked unit on a receipt.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum SerialStatus {
    Received,
    Missing,
}

/// One individually numbered unit listed on a transfer line.
///
/// The record itself never changes during a receiving session; only its
/// classification does, and that is tracked on the line state rather than
/// here so the roster can stay shared and immutable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialRecord {
    /// Unique identifier of the unit.
    pub id: Uuid,

    /// Operator-facing serial number as printed on the unit.
    pub name: String,
}

impl SerialRecord {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
