use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::serial::SerialStatus;

/// Per-unit outcome entry on a finalized receipt line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNumberEntry {
    pub id: Uuid,

    #[serde(rename = "serialName")]
    pub serial_name: String,

    pub status: SerialStatus,
}

/// One line of the outgoing receipt.
///
/// The serialized field names are a stable contract with the downstream
/// inventory-update service. Do not rename them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    #[serde(rename = "PricelistId")]
    pub pricelist_id: Uuid,

    /// Full roster population for serial-tracked lines so the downstream
    /// service sees every unit alongside its status; the effective received
    /// count for bulk lines.
    pub quantity: i32,

    #[serde(rename = "receiverPricelistId")]
    pub receiver_pricelist_id: Uuid,

    #[serde(rename = "serialNumbers")]
    pub serial_numbers: Vec<SerialNumberEntry>,
}

/// Immutable result of a finalized receiving session, ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    #[serde(rename = "transferId")]
    pub transfer_id: Uuid,

    pub lines: Vec<ReceiptLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_line_uses_contract_field_names() {
        let line = ReceiptLine {
            pricelist_id: Uuid::new_v4(),
            quantity: 3,
            receiver_pricelist_id: Uuid::new_v4(),
            serial_numbers: vec![SerialNumberEntry {
                id: Uuid::new_v4(),
                serial_name: "SN-1".to_string(),
                status: SerialStatus::Missing,
            }],
        };

        let json = serde_json::to_value(&line).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("PricelistId"));
        assert!(object.contains_key("quantity"));
        assert!(object.contains_key("receiverPricelistId"));
        assert!(object.contains_key("serialNumbers"));

        let entry = &json["serialNumbers"][0];
        assert!(entry.get("id").is_some());
        assert_eq!(entry["serialName"], "SN-1");
        assert_eq!(entry["status"], "Missing");
    }

    #[test]
    fn payload_round_trips() {
        let payload = ReceiptPayload {
            transfer_id: Uuid::new_v4(),
            lines: vec![],
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: ReceiptPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
