use crate::{
    entities::{
        order, order_item, payment, Order, OrderItem, PaymentMethod, PaymentModel, Product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    ids, metrics,
    services::{orders, payouts::PayoutService},
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// 15 (Amex) or 16 digit card numbers. Demo validation only; nothing is
/// charged.
static CARD_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{15,16}$").expect("card number pattern is valid"));

/// Card payment capture across all items of an order, with payout
/// splitting per item.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    payout_service: Arc<PayoutService>,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        payout_service: Arc<PayoutService>,
    ) -> Self {
        Self {
            db,
            event_sender,
            payout_service,
        }
    }

    /// Captures a card payment for the given order: one paid payment row
    /// per ordered item, each with its payout split, all in one
    /// transaction.
    #[instrument(skip(self, input))]
    pub async fn process_card_payment(
        &self,
        user_id: Uuid,
        input: ProcessPaymentInput,
    ) -> Result<Vec<PaymentModel>, ServiceError> {
        if !CARD_NUMBER_RE.is_match(&input.card_number) {
            return Err(ServiceError::ValidationError(
                "Card number must be 15 or 16 digits".to_string(),
            ));
        }
        if input.expiry_date.trim().is_empty() || input.cvv.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Card expiry date and CVV are required".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let order = Order::find()
            .filter(order::Column::OrderNumber.eq(input.order_id.as_str()))
            .filter(order::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .filter(order_item::Column::IsOrdered.eq(true))
            .all(&txn)
            .await?;

        if items.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Order has no items to pay for".to_string(),
            ));
        }

        let mut payments = Vec::with_capacity(items.len());
        for item in items {
            let product = Product::find_by_id(item.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

            let amount = orders::item_total(&product, item.quantity);
            let item_id = item.id;
            let seller_id = product.seller_id;

            let now = Utc::now();
            let row = payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                payment_number: Set(ids::generate_payment_number()),
                user_id: Set(user_id),
                order_item_id: Set(item_id),
                amount: Set(amount),
                method: Set(PaymentMethod::Card),
                is_paid: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let created = row.insert(&txn).await?;

            let mut item_update: order_item::ActiveModel = item.into();
            item_update.payment_id = Set(Some(created.id));
            item_update.updated_at = Set(now);
            item_update.update(&txn).await?;

            self.payout_service
                .create_split(&txn, item_id, seller_id, amount)
                .await?;

            payments.push(created);
        }

        txn.commit().await?;

        metrics::PAYMENTS_CAPTURED_TOTAL.inc_by(payments.len() as u64);
        for p in &payments {
            self.event_sender
                .send_or_log(Event::PaymentCaptured {
                    payment_id: p.id,
                    order_item_id: p.order_item_id,
                    amount: p.amount,
                })
                .await;
        }

        info!(
            "Captured card payment for order {}: {} payment(s)",
            input.order_id,
            payments.len()
        );
        Ok(payments)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentInput {
    /// External order number (`ORD-…`).
    pub order_id: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    /// Nominal order total as shown to the buyer. Recorded amounts derive
    /// from item totals, not this field.
    pub amount: rust_decimal::Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_number_shapes() {
        assert!(CARD_NUMBER_RE.is_match("4242424242424242"));
        assert!(CARD_NUMBER_RE.is_match("378282246310005"));
        assert!(!CARD_NUMBER_RE.is_match("1234"));
        assert!(!CARD_NUMBER_RE.is_match("4242-4242-4242-4242"));
        assert!(!CARD_NUMBER_RE.is_match("42424242424242424"));
        assert!(!CARD_NUMBER_RE.is_match("4242 4242 4242 4242"));
    }
}
