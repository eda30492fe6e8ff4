use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{ItemStatus, ReturnStatus};

/// Domain events emitted by the services. Consumed in-process by
/// [`process_events`]; delivery is best-effort and never blocks the
/// emitting request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartItemAdded {
        user_id: Uuid,
        order_item_id: Uuid,
        quantity: i32,
    },
    CartItemRemoved {
        user_id: Uuid,
        order_item_id: Uuid,
    },

    // Order events
    OrderPlaced {
        order_id: Uuid,
        item_count: usize,
    },
    OrderItemStatusChanged {
        order_item_id: Uuid,
        old_status: ItemStatus,
        new_status: ItemStatus,
    },

    // Payment events
    PaymentCreated {
        payment_id: Uuid,
        order_item_id: Uuid,
        amount: Decimal,
    },
    PaymentCaptured {
        payment_id: Uuid,
        order_item_id: Uuid,
        amount: Decimal,
    },
    PayoutsCreated {
        order_item_id: Uuid,
        seller_amount: Decimal,
        platform_amount: Decimal,
    },

    // Return events
    ReturnRequested {
        return_request_id: Uuid,
        order_item_id: Uuid,
    },
    ReturnDecided {
        return_request_id: Uuid,
        decision: ReturnStatus,
    },
    RefundIssued {
        refund_id: Uuid,
        return_request_id: Uuid,
        amount: Decimal,
    },

    // Catalog / account events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    SellerRegistered(Uuid),
    AddressCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
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

    /// Sends an event, logging instead of failing when the consumer is
    /// gone. Event delivery must never fail a request that already
    /// committed its transaction.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

/// Event consumer loop. Webhook/outbox fan-out is out of scope; events are
/// logged for observability and to keep emitters decoupled from any future
/// consumer.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                item_count,
            } => {
                info!(order_id = %order_id, item_count = *item_count, "Order placed");
            }
            Event::OrderItemStatusChanged {
                order_item_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_item_id = %order_item_id,
                    from = %old_status,
                    to = %new_status,
                    "Order item status changed"
                );
            }
            Event::PaymentCaptured {
                payment_id, amount, ..
            } => {
                info!(payment_id = %payment_id, amount = %amount, "Payment captured");
            }
            Event::RefundIssued {
                refund_id, amount, ..
            } => {
                info!(refund_id = %refund_id, amount = %amount, "Refund issued");
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender.send_or_log(Event::ProductCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let id = Uuid::new_v4();
        sender.send(Event::ProductCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::ProductCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
