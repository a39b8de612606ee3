use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::order::PaymentStatus;

/// Domain events emitted by the services. Consumed in-process by
/// [`process_events`], which logs them for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced {
        order_id: Uuid,
        seat_number: String,
        total_amount: Decimal,
    },
    PaymentStatusChanged {
        order_id: Uuid,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
    },
    FoodItemCreated(i64),
    FoodItemUpdated(i64),
    FoodItemDeleted(i64),
    CartCleared {
        session_id: String,
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

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Sends an event; a full or closed channel is logged and ignored so
    /// event delivery never fails a request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event delivery failed: {}", e);
        }
    }
}

/// Background consumer for domain events.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                seat_number,
                total_amount,
            } => {
                info!(order_id = %order_id, seat = %seat_number, total = %total_amount, "order placed");
            }
            Event::PaymentStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id = %order_id, ?old_status, ?new_status, "payment status changed");
            }
            Event::FoodItemCreated(id) => info!(food_item_id = id, "food item created"),
            Event::FoodItemUpdated(id) => info!(food_item_id = id, "food item updated"),
            Event::FoodItemDeleted(id) => info!(food_item_id = id, "food item deleted"),
            Event::CartCleared { session_id } => {
                info!(session_id = %session_id, "cart cleared");
            }
        }
    }
    info!("event channel closed; consumer exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::FoodItemCreated(7))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::FoodItemCreated(id)) => assert_eq!(id, 7),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out
        sender.send_or_log(Event::FoodItemDeleted(1)).await;
    }
}
