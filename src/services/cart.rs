use crate::{
    entities::{
        order, order_item, order_item_variant, product, product_variant, Order, OrderItem,
        OrderItemVariant, Product, ProductVariant,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    ids,
    services::orders::{OrderService, OrderView},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Cart operations over the user's single open order.
///
/// A cart is the unordered `Order` row plus its unordered items; there is
/// no separate cart table. Lines accumulate per product+variant-set:
/// adding the same selection again increments the existing line.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a product to the user's cart, accumulating quantity when an
    /// unordered line with the same variant set already exists.
    #[instrument(skip(self, input))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: &str,
        input: AddToCartInput,
    ) -> Result<OrderView, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = Product::find()
            .filter(product::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        // Requested variants must belong to the product.
        let requested: HashSet<Uuid> = input.variant_ids.iter().copied().collect();
        if !requested.is_empty() {
            let known = ProductVariant::find()
                .filter(product_variant::Column::ProductId.eq(product.id))
                .filter(product_variant::Column::Id.is_in(requested.iter().copied()))
                .count(&txn)
                .await?;
            if known as usize != requested.len() {
                return Err(ServiceError::ValidationError(
                    "Invalid format for variants".to_string(),
                ));
            }
        }

        let order = self.get_or_create_open_order(&txn, user_id).await?;

        // Match an existing line with the identical variant set.
        let existing_items = OrderItem::find()
            .filter(order_item::Column::UserId.eq(user_id))
            .filter(order_item::Column::ProductId.eq(product.id))
            .filter(order_item::Column::IsOrdered.eq(false))
            .all(&txn)
            .await?;

        let mut matched = None;
        for item in existing_items {
            let selected: HashSet<Uuid> = OrderItemVariant::find()
                .filter(order_item_variant::Column::OrderItemId.eq(item.id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|r| r.product_variant_id)
                .collect();
            if selected == requested {
                matched = Some(item);
                break;
            }
        }

        let item_id = if let Some(item) = matched {
            let id = item.id;
            let quantity = item.quantity + input.quantity;
            let mut active: order_item::ActiveModel = item.into();
            active.quantity = Set(quantity);
            active.updated_at = Set(Utc::now());
            active.update(&txn).await?;
            id
        } else {
            let id = Uuid::new_v4();
            let now = Utc::now();
            let item = order_item::ActiveModel {
                id: Set(id),
                item_number: Set(ids::generate_item_number()),
                order_id: Set(order.id),
                user_id: Set(user_id),
                product_id: Set(product.id),
                quantity: Set(input.quantity),
                is_ordered: Set(false),
                shipping_address_id: Set(None),
                payment_id: Set(None),
                refund_id: Set(None),
                courier: Set(None),
                tracking_number: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            item.insert(&txn).await?;

            for variant_id in &requested {
                let selection = order_item_variant::ActiveModel {
                    order_item_id: Set(id),
                    product_variant_id: Set(*variant_id),
                };
                selection.insert(&txn).await?;
            }
            id
        };

        let view = OrderService::order_view(&txn, order).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id,
                order_item_id: item_id,
                quantity: input.quantity,
            })
            .await;

        info!(
            "Added product {} x{} to cart for user {}",
            product_id, input.quantity, user_id
        );
        Ok(view)
    }

    /// The user's open order as a snapshot; `None` when the cart is empty.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<Option<OrderView>, ServiceError> {
        let order = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::IsOrdered.eq(false))
            .one(&*self.db)
            .await?;

        match order {
            Some(order) => Ok(Some(OrderService::order_view(&*self.db, order).await?)),
            None => Ok(None),
        }
    }

    /// Number of unordered items in the user's cart.
    pub async fn cart_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let count = OrderItem::find()
            .filter(order_item::Column::UserId.eq(user_id))
            .filter(order_item::Column::IsOrdered.eq(false))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    /// Increments or decrements a cart line; decrementing to zero removes
    /// the line.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        item_number: &str,
        method: QuantityUpdate,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let item = self.find_cart_item(&txn, user_id, item_number).await?;

        match method {
            QuantityUpdate::Increment => {
                let quantity = item.quantity + 1;
                let mut active: order_item::ActiveModel = item.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(Utc::now());
                active.update(&txn).await?;
            }
            QuantityUpdate::Decrement => {
                if item.quantity <= 1 {
                    let item_id = item.id;
                    OrderItem::delete_by_id(item_id).exec(&txn).await?;
                } else {
                    let quantity = item.quantity - 1;
                    let mut active: order_item::ActiveModel = item.into();
                    active.quantity = Set(quantity);
                    active.updated_at = Set(Utc::now());
                    active.update(&txn).await?;
                }
            }
        }

        txn.commit().await?;
        Ok(())
    }

    /// Removes a cart line entirely.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_number: &str) -> Result<(), ServiceError> {
        let item = self.find_cart_item(&*self.db, user_id, item_number).await?;
        let item_id = item.id;

        OrderItem::delete_by_id(item_id).exec(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                user_id,
                order_item_id: item_id,
            })
            .await;

        Ok(())
    }

    async fn find_cart_item<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        item_number: &str,
    ) -> Result<order_item::Model, ServiceError> {
        OrderItem::find()
            .filter(order_item::Column::ItemNumber.eq(item_number))
            .filter(order_item::Column::UserId.eq(user_id))
            .filter(order_item::Column::IsOrdered.eq(false))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order item not found".to_string()))
    }

    /// Get-or-create of the single open order, inside the caller's
    /// transaction so concurrent adds cannot double-create it.
    async fn get_or_create_open_order(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        let existing = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::IsOrdered.eq(false))
            .one(txn)
            .await?;

        if let Some(order) = existing {
            return Ok(order);
        }

        let now = Utc::now();
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(ids::generate_order_number()),
            user_id: Set(user_id),
            is_ordered: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(order.insert(txn).await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub quantity: i32,
    #[serde(default)]
    pub variant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUpdate {
    Increment,
    Decrement,
}
