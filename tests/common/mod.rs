#![allow(dead_code)]

use tokio::sync::mpsc;
use transfer_receiving::events::{self, Event, EventSender};
use transfer_receiving::models::{ProductRef, SerialRecord, Transfer, TransferLine};
use uuid::Uuid;

pub fn product(name: &str) -> ProductRef {
    ProductRef {
        pricelist_id: Uuid::new_v4(),
        receiver_pricelist_id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

/// Serial-tracked line with `serial_count` numbered units.
pub fn serial_line(expected: i32, serial_count: usize) -> TransferLine {
    TransferLine {
        id: Uuid::new_v4(),
        product: product("Serialized item"),
        expected_quantity: expected,
        serial_roster: (1..=serial_count)
            .map(|n| SerialRecord::new(Uuid::new_v4(), format!("SN-{:04}", n)))
            .collect(),
    }
}

/// Bulk line with no serial roster.
pub fn bulk_line(expected: i32) -> TransferLine {
    TransferLine {
        id: Uuid::new_v4(),
        product: product("Bulk item"),
        expected_quantity: expected,
        serial_roster: vec![],
    }
}

pub fn transfer_with(lines: Vec<TransferLine>) -> Transfer {
    Transfer {
        id: Uuid::new_v4(),
        from_location_id: Uuid::new_v4(),
        to_location_id: Uuid::new_v4(),
        lines,
    }
}

/// Bounded event channel sized generously for a test session.
pub fn event_channel() -> (EventSender, mpsc::Receiver<Event>) {
    events::channel(64)
}

/// Collects whatever events have been published so far.
pub fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(event) = rx.try_recv() {
        collected.push(event);
    }
    collected
}
