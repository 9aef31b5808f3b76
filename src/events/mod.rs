//! In-process domain events.
//!
//! Services emit events after successful mutations; a background task drains
//! the channel and writes them to the structured log. Event delivery is
//! best-effort and never blocks or fails the originating request.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the order workflow and its satellites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled(Uuid),
    OrderCompleted(Uuid),
    OrderFinalized {
        order_id: Uuid,
        final_price_cents: i64,
        final_days: i32,
    },
    ChangeRequestCreated(Uuid),
    ChangeRequestApproved {
        change_request_id: Uuid,
        order_id: Uuid,
    },
    ChangeRequestRejected(Uuid),
    ProgressLogged {
        order_id: Uuid,
        log_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "Order status changed"
                );
            }
            other => info!(event = ?other, "Domain event"),
        }
    }
    warn!("Event channel closed; event processor stopping");
}
