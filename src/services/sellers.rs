use crate::{
    entities::{
        order_item, product, seller, OrderItem, Product, ProductModel, Seller, SellerModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Seller accounts and the seller dashboard reads.
#[derive(Clone)]
pub struct SellerService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SellerService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates the one-to-one seller profile for a user account.
    #[instrument(skip(self, input))]
    pub async fn register(
        &self,
        user_id: Uuid,
        input: RegisterSellerInput,
    ) -> Result<SellerModel, ServiceError> {
        let existing = Seller::find()
            .filter(seller::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "User already has a seller profile".to_string(),
            ));
        }

        let now = Utc::now();
        let row = seller::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            business_name: Set(input.business_name),
            business_address: Set(input.business_address),
            phone_number: Set(input.phone_number),
            is_active: Set(false),
            is_approved: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = row.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SellerRegistered(created.id))
            .await;

        info!("Seller profile created for user {}", user_id);
        Ok(created)
    }

    /// The user's seller profile; 404 when none exists.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<SellerModel, ServiceError> {
        Seller::find()
            .filter(seller::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("User does not have a seller profile".to_string())
            })
    }

    /// Seller gate for fulfillment endpoints; 403 when the caller has no
    /// profile.
    pub async fn require_profile(&self, user_id: Uuid) -> Result<SellerModel, ServiceError> {
        Seller::find()
            .filter(seller::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::Forbidden("User does not have a seller profile".to_string())
            })
    }

    /// Probe used by storefront navigation.
    pub async fn status(&self, user_id: Uuid) -> Result<SellerStatus, ServiceError> {
        let profile = Seller::find()
            .filter(seller::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?;

        Ok(SellerStatus {
            is_seller: profile.is_some(),
            is_approved: profile.as_ref().map(|s| s.is_approved).unwrap_or(false),
            profile,
        })
    }

    /// Sales totals over the selected window.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(
        &self,
        seller_id: Uuid,
        period: StatsPeriod,
    ) -> Result<DashboardStats, ServiceError> {
        let mut query = OrderItem::find()
            .find_also_related(Product)
            .filter(product::Column::SellerId.eq(seller_id))
            .filter(order_item::Column::IsOrdered.eq(true));

        if let Some(days) = period.days() {
            let start = Utc::now() - Duration::days(days);
            query = query.filter(order_item::Column::CreatedAt.gte(start));
        }

        let rows = query.all(&*self.db).await?;

        let mut total_sales = Decimal::ZERO;
        let total_orders = rows.len() as u64;
        for (item, prod) in &rows {
            if let Some(prod) = prod {
                total_sales += orders::item_total(prod, item.quantity);
            }
        }
        let average_order = if total_orders > 0 {
            total_sales / Decimal::from(total_orders)
        } else {
            Decimal::ZERO
        };

        Ok(DashboardStats {
            total_sales,
            total_orders,
            average_order,
            period,
        })
    }

    /// The seller's products ordered by units sold.
    #[instrument(skip(self))]
    pub async fn top_products(&self, seller_id: Uuid) -> Result<Vec<ProductModel>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::SellerId.eq(seller_id))
            .order_by_desc(product::Column::Sold)
            .all(&*self.db)
            .await?;
        Ok(products)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterSellerInput {
    pub business_name: String,
    pub business_address: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerStatus {
    pub is_seller: bool,
    pub is_approved: bool,
    #[schema(value_type = Object)]
    pub profile: Option<SellerModel>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Daily,
    #[default]
    Monthly,
    Yearly,
    All,
}

impl StatsPeriod {
    fn days(&self) -> Option<i64> {
        match self {
            StatsPeriod::Daily => Some(1),
            StatsPeriod::Monthly => Some(30),
            StatsPeriod::Yearly => Some(365),
            StatsPeriod::All => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_sales: Decimal,
    pub total_orders: u64,
    pub average_order: Decimal,
    pub period: StatsPeriod,
}
