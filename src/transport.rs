/*!
 * # Transport Layer
 *
 * Seams between the receiving engine and the surrounding application:
 * where transfers are fetched from and where finalized receipts are
 * submitted to. The engine performs no network or storage I/O of its own;
 * the embedding application supplies implementations of these traits.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ReceiptPayload, Transfer};

/// Transport-layer errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transfer {0} not found")]
    TransferNotFound(Uuid),
    #[error("Connection error: {0}")]
    ConnectionError(String),
    #[error("Payload rejected: {0}")]
    PayloadRejected(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Acknowledgement returned by the inventory-update service on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub receipt_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

/// Source of transfer records awaiting receipt.
#[async_trait]
pub trait TransferSource: Send + Sync {
    async fn fetch_transfer(&self, transfer_id: Uuid) -> Result<Transfer, TransportError>;
}

/// Sink for finalized receipt payloads.
#[async_trait]
pub trait ReceiptSubmitter: Send + Sync {
    async fn submit(&self, payload: &ReceiptPayload) -> Result<SubmissionAck, TransportError>;
}

/// In-memory transfer source for tests and standalone runs.
#[derive(Debug, Default)]
pub struct InMemoryTransferSource {
    transfers: Arc<Mutex<HashMap<Uuid, Transfer>>>,
}

impl InMemoryTransferSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, transfer: Transfer) {
        self.transfers.lock().unwrap().insert(transfer.id, transfer);
    }
}

#[async_trait]
impl TransferSource for InMemoryTransferSource {
    async fn fetch_transfer(&self, transfer_id: Uuid) -> Result<Transfer, TransportError> {
        self.transfers
            .lock()
            .unwrap()
            .get(&transfer_id)
            .cloned()
            .ok_or(TransportError::TransferNotFound(transfer_id))
    }
}

/// In-memory submitter that accepts everything and keeps what it was given.
#[derive(Debug, Default)]
pub struct InMemoryReceiptSubmitter {
    submitted: Arc<Mutex<Vec<ReceiptPayload>>>,
}

impl InMemoryReceiptSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<ReceiptPayload> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReceiptSubmitter for InMemoryReceiptSubmitter {
    async fn submit(&self, payload: &ReceiptPayload) -> Result<SubmissionAck, TransportError> {
        self.submitted.lock().unwrap().push(payload.clone());
        Ok(SubmissionAck {
            receipt_id: Uuid::new_v4(),
            accepted_at: Utc::now(),
        })
    }
}

/// Submitter that rejects every payload, for failure-path tests.
#[cfg(test)]
pub struct RejectingReceiptSubmitter {
    reason: String,
}

#[cfg(test)]
impl RejectingReceiptSubmitter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ReceiptSubmitter for RejectingReceiptSubmitter {
    async fn submit(&self, _payload: &ReceiptPayload) -> Result<SubmissionAck, TransportError> {
        Err(TransportError::PayloadRejected(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductRef, TransferLine};

    fn sample_transfer() -> Transfer {
        Transfer {
            id: Uuid::new_v4(),
            from_location_id: Uuid::new_v4(),
            to_location_id: Uuid::new_v4(),
            lines: vec![TransferLine {
                id: Uuid::new_v4(),
                product: ProductRef {
                    pricelist_id: Uuid::new_v4(),
                    receiver_pricelist_id: Uuid::new_v4(),
                    name: "Monitor".to_string(),
                },
                expected_quantity: 2,
                serial_roster: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn in_memory_source_round_trips_transfers() {
        let source = InMemoryTransferSource::new();
        let transfer = sample_transfer();
        source.insert(transfer.clone());

        let fetched = source.fetch_transfer(transfer.id).await.unwrap();
        assert_eq!(fetched, transfer);
    }

    #[tokio::test]
    async fn unknown_transfer_is_reported() {
        let source = InMemoryTransferSource::new();
        let missing = Uuid::new_v4();

        let err = source.fetch_transfer(missing).await.unwrap_err();
        assert!(matches!(err, TransportError::TransferNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn in_memory_submitter_records_payloads() {
        let submitter = InMemoryReceiptSubmitter::new();
        let payload = ReceiptPayload {
            transfer_id: Uuid::new_v4(),
            lines: vec![],
        };

        let ack = submitter.submit(&payload).await.unwrap();
        assert!(ack.accepted_at <= Utc::now());

        let recorded = submitter.submitted();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], payload);
    }

    #[tokio::test]
    async fn rejecting_submitter_surfaces_the_reason() {
        let submitter = RejectingReceiptSubmitter::new("duplicate receipt");
        let payload = ReceiptPayload {
            transfer_id: Uuid::new_v4(),
            lines: vec![],
        };

        let err = submitter.submit(&payload).await.unwrap_err();
        assert!(matches!(err, TransportError::PayloadRejected(reason) if reason == "duplicate receipt"));
    }
}
