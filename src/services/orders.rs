use crate::{
    entities::{
        order, order_item, product, return_request, ItemStatus, Order, OrderItem, OrderItemModel,
        OrderItemStatusModel, OrderModel, Product, ProductModel, ProductVariant, ReturnRequest,
        ReturnRequestModel, ReturnRequestStatusModel, ReturnStatus,
    },
    errors::ServiceError,
    services::ledger,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Read side of the order aggregate: buyer and seller order listings and
/// item detail, with totals always derived from live product prices.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// A buyer's placed orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, ServiceError> {
        let orders = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::IsOrdered.eq(true))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut views = Vec::with_capacity(orders.len());
        for o in orders {
            views.push(Self::order_view(&*self.db, o).await?);
        }
        Ok(views)
    }

    /// One of the buyer's orders by external number.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        user_id: Uuid,
        order_number: &str,
    ) -> Result<OrderView, ServiceError> {
        let order = Order::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        Self::order_view(&*self.db, order).await
    }

    /// Buyer-side item detail, including any return request.
    #[instrument(skip(self))]
    pub async fn get_order_item(
        &self,
        user_id: Uuid,
        item_number: &str,
    ) -> Result<OrderItemDetail, ServiceError> {
        let item = OrderItem::find()
            .filter(order_item::Column::ItemNumber.eq(item_number))
            .filter(order_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order item not found".to_string()))?;

        Self::item_detail(&*self.db, item).await
    }

    /// All ordered items whose product belongs to the seller, newest first.
    #[instrument(skip(self))]
    pub async fn seller_orders(
        &self,
        seller_id: Uuid,
    ) -> Result<Vec<OrderItemView>, ServiceError> {
        let rows = OrderItem::find()
            .find_also_related(Product)
            .filter(product::Column::SellerId.eq(seller_id))
            .filter(order_item::Column::IsOrdered.eq(true))
            .order_by_desc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut views = Vec::with_capacity(rows.len());
        for (item, _) in rows {
            views.push(Self::item_view(&*self.db, item).await?);
        }
        Ok(views)
    }

    /// Seller-side item detail. The item must belong to one of the
    /// seller's products.
    #[instrument(skip(self))]
    pub async fn seller_order_item_detail(
        &self,
        seller_id: Uuid,
        item_number: &str,
    ) -> Result<OrderItemDetail, ServiceError> {
        let item = find_seller_item(&*self.db, seller_id, item_number).await?;
        Self::item_detail(&*self.db, item).await
    }

    /// Assembles the order snapshot: items, per-line totals and the
    /// derived order total.
    pub async fn order_view<C: ConnectionTrait>(
        conn: &C,
        order: OrderModel,
    ) -> Result<OrderView, ServiceError> {
        let items = order
            .find_related(OrderItem)
            .order_by_asc(order_item::Column::CreatedAt)
            .all(conn)
            .await?;

        let mut item_views = Vec::with_capacity(items.len());
        let mut order_total = Decimal::ZERO;
        for item in items {
            let view = Self::item_view(conn, item).await?;
            order_total += view.line_total;
            item_views.push(view);
        }

        Ok(OrderView {
            id: order.id,
            order_number: order.order_number,
            is_ordered: order.is_ordered,
            order_total,
            items: item_views,
            created_at: order.created_at,
        })
    }

    pub async fn item_view<C: ConnectionTrait>(
        conn: &C,
        item: OrderItemModel,
    ) -> Result<OrderItemView, ServiceError> {
        let product = Product::find_by_id(item.product_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let variants = item
            .find_related(ProductVariant)
            .all(conn)
            .await?
            .into_iter()
            .map(|v| VariantView {
                id: v.id,
                name: v.name,
                value: v.value,
            })
            .collect();

        let history = ledger::item_status_history(conn, item.id).await?;
        let current_status = history.last().map(StatusView::from);
        let status_history = history.iter().map(StatusView::from).collect();

        let line_total = item_total(&product, item.quantity);

        Ok(OrderItemView {
            id: item.id,
            item_number: item.item_number,
            quantity: item.quantity,
            is_ordered: item.is_ordered,
            product: ProductSummary::from(product),
            variants,
            current_status,
            status_history,
            shipping_address_id: item.shipping_address_id,
            courier: item.courier,
            tracking_number: item.tracking_number,
            line_total,
            created_at: item.created_at,
        })
    }

    async fn item_detail<C: ConnectionTrait>(
        conn: &C,
        item: OrderItemModel,
    ) -> Result<OrderItemDetail, ServiceError> {
        let return_request = ReturnRequest::find()
            .filter(return_request::Column::OrderItemId.eq(item.id))
            .one(conn)
            .await?;

        let return_view = match return_request {
            Some(rr) => Some(return_request_view(conn, rr).await?),
            None => None,
        };

        let item = Self::item_view(conn, item).await?;
        Ok(OrderItemDetail {
            is_return_request: return_view.is_some(),
            return_request: return_view,
            item,
        })
    }
}

/// Effective line total: discounted price when present, base price
/// otherwise, times quantity. Variant price adjustments do not enter
/// totals.
pub fn item_total(product: &ProductModel, quantity: i32) -> Decimal {
    product.effective_price() * Decimal::from(quantity)
}

/// Looks up an ordered item by number, scoped to products owned by the
/// seller. Unknown numbers and other sellers' items are indistinguishable.
pub async fn find_seller_item<C: ConnectionTrait>(
    conn: &C,
    seller_id: Uuid,
    item_number: &str,
) -> Result<OrderItemModel, ServiceError> {
    let row = OrderItem::find()
        .find_also_related(Product)
        .filter(order_item::Column::ItemNumber.eq(item_number))
        .filter(product::Column::SellerId.eq(seller_id))
        .one(conn)
        .await?;

    match row {
        Some((item, _)) => Ok(item),
        None => Err(ServiceError::NotFound("Order item not found".to_string())),
    }
}

pub async fn return_request_view<C: ConnectionTrait>(
    conn: &C,
    rr: ReturnRequestModel,
) -> Result<ReturnRequestView, ServiceError> {
    let history = ledger::return_status_history(conn, rr.id).await?;
    Ok(ReturnRequestView {
        id: rr.id,
        reason: rr.reason,
        description: rr.description,
        is_approved: rr.is_approved,
        current_status: history.last().map(|e| e.status),
        status_history: history.into_iter().map(ReturnStatusView::from).collect(),
        created_at: rr.created_at,
    })
}

// View models

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub is_ordered: bool,
    pub order_total: Decimal,
    pub items: Vec<OrderItemView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemView {
    pub id: Uuid,
    pub item_number: String,
    pub quantity: i32,
    pub is_ordered: bool,
    pub product: ProductSummary,
    pub variants: Vec<VariantView>,
    pub current_status: Option<StatusView>,
    pub status_history: Vec<StatusView>,
    pub shipping_address_id: Option<Uuid>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItemView,
    pub return_request: Option<ReturnRequestView>,
    pub is_return_request: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub product_id: String,
    pub name: String,
    pub base_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    pub sold: i32,
    pub is_active: bool,
}

impl From<ProductModel> for ProductSummary {
    fn from(p: ProductModel) -> Self {
        Self {
            id: p.id,
            product_id: p.product_id,
            name: p.name,
            base_price: p.base_price,
            discount_price: p.discount_price,
            stock: p.stock,
            sold: p.sold,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VariantView {
    pub id: Uuid,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusView {
    #[schema(value_type = String)]
    pub status: ItemStatus,
    pub shipped_from: Option<String>,
    pub shipped_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderItemStatusModel> for StatusView {
    fn from(e: &OrderItemStatusModel) -> Self {
        Self {
            status: e.status,
            shipped_from: e.shipped_from.clone(),
            shipped_to: e.shipped_to.clone(),
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnRequestView {
    pub id: Uuid,
    pub reason: String,
    pub description: Option<String>,
    pub is_approved: bool,
    #[schema(value_type = Option<String>)]
    pub current_status: Option<ReturnStatus>,
    pub status_history: Vec<ReturnStatusView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnStatusView {
    #[schema(value_type = String)]
    pub status: ReturnStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReturnRequestStatusModel> for ReturnStatusView {
    fn from(e: ReturnRequestStatusModel) -> Self {
        Self {
            status: e.status,
            reason: e.reason,
            created_at: e.created_at,
        }
    }
}
