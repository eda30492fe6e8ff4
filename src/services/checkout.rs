use crate::{
    entities::{
        address, order, order_item, product, Address, ItemStatus, Order, OrderItem, PaymentMethod,
        Product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    ids, metrics,
    services::{ledger, orders, payouts::PayoutService},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Converts the user's open cart into a placed order.
///
/// The whole conversion runs in one transaction: either every cart line is
/// frozen, stamped and counted against stock, or nothing is.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    payout_service: Arc<PayoutService>,
}

impl CheckoutService {
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

    /// Places the order: freezes every unordered item, opens its status
    /// ledger at Pending, adjusts stock/sold counters and, for
    /// cash-on-delivery, creates the unpaid payment rows plus payout
    /// split.
    #[instrument(skip(self, input))]
    pub async fn checkout(
        &self,
        user_id: Uuid,
        input: CheckoutInput,
    ) -> Result<CheckoutOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        // Shipping address must exist and belong to the buyer.
        let shipping_address = Address::find_by_id(input.shipping_address_id)
            .filter(address::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Shipping address not found".to_string()))?;

        let open_order = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::IsOrdered.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::InvalidOperation("Cart is empty".to_string()))?;

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(open_order.id))
            .filter(order_item::Column::IsOrdered.eq(false))
            .all(&txn)
            .await?;

        if items.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let item_count = items.len();
        let mut cod_payments = Vec::new();
        for item in items {
            if let Some(payment) = self
                .place_item(&txn, user_id, shipping_address.id, input.payment_method, item)
                .await?
            {
                cod_payments.push(payment);
            }
        }

        let order_id = open_order.id;
        let order_number = open_order.order_number.clone();
        let mut order_update: order::ActiveModel = open_order.into();
        order_update.is_ordered = Set(true);
        order_update.updated_at = Set(Utc::now());
        order_update.update(&txn).await?;

        txn.commit().await?;

        metrics::ORDERS_PLACED_TOTAL.inc();
        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                item_count,
            })
            .await;
        for payment in cod_payments {
            self.event_sender
                .send_or_log(Event::PaymentCreated {
                    payment_id: payment.id,
                    order_item_id: payment.order_item_id,
                    amount: payment.amount,
                })
                .await;
        }

        info!(
            "Checkout completed: order {} with {} item(s) for user {}",
            order_number, item_count, user_id
        );
        Ok(CheckoutOutcome {
            order_id,
            order_number,
        })
    }

    async fn place_item(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        shipping_address_id: Uuid,
        payment_method: PaymentMethod,
        item: order_item::Model,
    ) -> Result<Option<crate::entities::PaymentModel>, ServiceError> {
        let product = Product::find_by_id(item.product_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        if product.stock < item.quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "Product {} has {} in stock, {} requested",
                product.product_id, product.stock, item.quantity
            )));
        }

        let amount = orders::item_total(&product, item.quantity);
        let item_id = item.id;
        let quantity = item.quantity;
        let seller_id = product.seller_id;

        let stock = product.stock - quantity;
        let sold = product.sold + quantity;
        let mut product_update: product::ActiveModel = product.into();
        product_update.stock = Set(stock);
        product_update.sold = Set(sold);
        product_update.updated_at = Set(Utc::now());
        product_update.update(txn).await?;

        let mut item_update: order_item::ActiveModel = item.into();
        item_update.is_ordered = Set(true);
        item_update.shipping_address_id = Set(Some(shipping_address_id));
        item_update.updated_at = Set(Utc::now());

        // Cash on delivery settles later; the payment row exists from
        // checkout so the payout split can be derived immediately.
        let mut cod_payment = None;
        if payment_method == PaymentMethod::Cod {
            let payment = crate::entities::payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                payment_number: Set(ids::generate_payment_number()),
                user_id: Set(user_id),
                order_item_id: Set(item_id),
                amount: Set(amount),
                method: Set(PaymentMethod::Cod),
                is_paid: Set(false),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
            };
            let payment = payment.insert(txn).await?;
            item_update.payment_id = Set(Some(payment.id));

            self.payout_service
                .create_split(txn, item_id, seller_id, amount)
                .await?;

            cod_payment = Some(payment);
        }

        item_update.update(txn).await?;

        ledger::append_item_status(txn, item_id, ItemStatus::Pending, None, None).await?;

        Ok(cod_payment)
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub shipping_address_id: Uuid,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, serde::Serialize)]
pub struct CheckoutOutcome {
    pub order_id: Uuid,
    pub order_number: String,
}
