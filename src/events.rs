use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Domain events published by a receiving session.
///
/// Consumers subscribe for audit trails and operator notifications; nothing
/// in the session itself depends on an event being delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SessionInitialized {
        transfer_id: Uuid,
        line_count: usize,
    },
    /// A line's displayed received quantity moved, whether through a direct
    /// edit, a restore, or a confirmed reduction.
    ReceivedQuantityChanged {
        line_id: Uuid,
        previous: i32,
        current: i32,
    },
    SerialRestored {
        line_id: Uuid,
        serial_id: Uuid,
    },
    SerialMarkedMissing {
        line_id: Uuid,
        serial_id: Uuid,
    },
    /// A destructive edit was proposed and now waits on the operator.
    ConfirmationRequested {
        line_id: Uuid,
        serials_at_risk: usize,
    },
    PendingConfirmed {
        line_id: Uuid,
        serials_flagged: usize,
    },
    PendingCancelled {
        line_id: Uuid,
    },
    ShortageDetected {
        line_id: Uuid,
        expected_quantity: i32,
        effective_quantity: i32,
    },
    ReceiptFinalized {
        transfer_id: Uuid,
        line_count: usize,
        short_line_count: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, waiting for channel capacity.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Non-blocking publish used from the synchronous session path. A full
    /// or closed channel costs a log line, never the edit itself.
    pub fn send_or_log(&self, event: Event) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(?event, "Event channel full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                error!(?event, "Event channel closed; dropping event");
            }
        }
    }
}

/// Creates a bounded event channel, normally sized from configuration.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains session events and logs the ones operators and auditors care
/// about. Runs until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting receiving event loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SerialMarkedMissing { line_id, serial_id } => {
                info!(%line_id, %serial_id, "Serial unit flagged missing");
            }
            Event::ConfirmationRequested {
                line_id,
                serials_at_risk,
            } => {
                info!(%line_id, serials_at_risk, "Destructive edit awaiting confirmation");
            }
            Event::ShortageDetected {
                line_id,
                expected_quantity,
                effective_quantity,
            } => {
                warn!(
                    %line_id,
                    expected_quantity, effective_quantity, "Line short of expectation"
                );
            }
            Event::ReceiptFinalized {
                transfer_id,
                line_count,
                short_line_count,
            } => {
                info!(%transfer_id, line_count, short_line_count, "Receipt finalized");
            }
            other => {
                debug!(event = ?other, "Receiving event");
            }
        }
    }

    warn!("Receiving event loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (sender, mut rx) = channel(4);
        let line_id = Uuid::new_v4();

        sender
            .send(Event::PendingCancelled { line_id })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::PendingCancelled { line_id: got }) => assert_eq!(got, line_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn send_or_log_swallows_a_full_channel() {
        let (sender, _rx) = channel(1);
        let line_id = Uuid::new_v4();

        sender.send_or_log(Event::PendingCancelled { line_id });
        // Capacity exhausted; this one is dropped and logged.
        sender.send_or_log(Event::PendingCancelled { line_id });
    }

    #[test]
    fn send_or_log_swallows_a_closed_channel() {
        let (sender, rx) = channel(1);
        drop(rx);

        sender.send_or_log(Event::SessionInitialized {
            transfer_id: Uuid::new_v4(),
            line_count: 0,
        });
    }

    #[test]
    fn events_serialize_for_audit_sinks() {
        let event = Event::ReceivedQuantityChanged {
            line_id: Uuid::new_v4(),
            previous: 5,
            current: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ReceivedQuantityChanged"));
    }
}
