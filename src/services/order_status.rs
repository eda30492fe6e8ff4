use crate::{
    entities::{order_item, ItemStatus, OrderItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle::StateMachine,
    services::{ledger, orders::find_seller_item},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Seller-driven fulfillment transitions on the order item ledger.
#[derive(Clone)]
pub struct OrderStatusService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderStatusService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Advances one order item along the fulfillment table. Only the
    /// seller owning the item's product may call this; Shipped requires
    /// complete shipping details, which are recorded on the event
    /// (shipped_from/to) and the item (courier/tracking).
    #[instrument(skip(self, input))]
    pub async fn update_status(
        &self,
        seller_id: Uuid,
        item_number: &str,
        input: UpdateStatusInput,
    ) -> Result<OrderItemModel, ServiceError> {
        let txn = self.db.begin().await?;

        let item = find_seller_item(&txn, seller_id, item_number).await?;
        if !item.is_ordered {
            return Err(ServiceError::InvalidOperation(
                "Order item has not been placed yet".to_string(),
            ));
        }

        // An item placed by checkout always has a Pending event; treat a
        // missing ledger the same way for robustness.
        let current = ledger::current_item_status(&txn, item.id)
            .await?
            .map(|e| e.status)
            .unwrap_or(ItemStatus::Pending);

        if !current.accepts(input.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Invalid status transition from {} to {}",
                current, input.status
            )));
        }

        let mut shipped_from = None;
        let mut shipped_to = None;
        let mut courier = None;
        let mut tracking = None;
        if input.status == ItemStatus::Shipped {
            let details = input.shipping_details.as_ref().filter(|d| d.is_complete());
            let details = details.ok_or_else(|| {
                ServiceError::ValidationError(
                    "Shipping details are required for Shipped status".to_string(),
                )
            })?;
            shipped_from = Some(details.shipped_from.clone());
            shipped_to = Some(details.shipped_to.clone());
            courier = Some(details.courier.clone());
            tracking = Some(details.tracking_id.clone());
        }

        let item_id = item.id;
        ledger::append_item_status(&txn, item_id, input.status, shipped_from, shipped_to).await?;

        let mut item_update: order_item::ActiveModel = item.into();
        if courier.is_some() {
            item_update.courier = Set(courier);
            item_update.tracking_number = Set(tracking);
        }
        item_update.updated_at = Set(Utc::now());
        let updated = item_update.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderItemStatusChanged {
                order_item_id: item_id,
                old_status: current,
                new_status: input.status,
            })
            .await;

        info!(
            "Order item {} status updated from {} to {}",
            item_number, current, input.status
        );
        Ok(updated)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: ItemStatus,
    pub shipping_details: Option<ShippingDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingDetails {
    pub shipped_from: String,
    pub shipped_to: String,
    pub courier: String,
    pub tracking_id: String,
}

impl ShippingDetails {
    fn is_complete(&self) -> bool {
        [
            &self.shipped_from,
            &self.shipped_to,
            &self.courier,
            &self.tracking_id,
        ]
        .iter()
        .all(|f| !f.trim().is_empty())
    }
}
