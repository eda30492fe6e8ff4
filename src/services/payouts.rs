use crate::{
    config::AppConfig,
    entities::{payout, Payout, PayoutModel, PayoutParty},
    errors::ServiceError,
    events::{Event, EventSender},
    ids, metrics,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Splits captured payments into seller and platform payout records.
#[derive(Clone)]
pub struct PayoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

/// `seller = amount × (1 − fee/100)`, `platform = amount × fee/100`.
/// The two shares always sum to the input amount.
pub fn split_amount(amount: Decimal, fee_percent: u32) -> (Decimal, Decimal) {
    let fee = Decimal::from(fee_percent) / Decimal::from(100);
    let platform = amount * fee;
    let seller = amount * (Decimal::ONE - fee);
    (seller, platform)
}

impl PayoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
        }
    }

    /// Creates the seller and platform payout rows for one paid order
    /// item, inside the caller's transaction.
    pub async fn create_split<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_item_id: Uuid,
        seller_id: Uuid,
        amount: Decimal,
    ) -> Result<(PayoutModel, PayoutModel), ServiceError> {
        let (seller_amount, platform_amount) =
            split_amount(amount, self.config.platform_fee_percent);
        let now = Utc::now();

        let seller_row = payout::ActiveModel {
            id: Set(Uuid::new_v4()),
            payout_number: Set(ids::generate_payout_number()),
            order_item_id: Set(order_item_id),
            party: Set(PayoutParty::Seller),
            seller_id: Set(Some(seller_id)),
            amount: Set(seller_amount),
            is_paid: Set(false),
            is_refunded: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let seller_row = seller_row.insert(conn).await?;

        let platform_row = payout::ActiveModel {
            id: Set(Uuid::new_v4()),
            payout_number: Set(ids::generate_payout_number()),
            order_item_id: Set(order_item_id),
            party: Set(PayoutParty::Platform),
            seller_id: Set(None),
            amount: Set(platform_amount),
            is_paid: Set(false),
            is_refunded: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let platform_row = platform_row.insert(conn).await?;

        metrics::PAYOUTS_CREATED_TOTAL.inc_by(2);
        self.event_sender
            .send_or_log(Event::PayoutsCreated {
                order_item_id,
                seller_amount,
                platform_amount,
            })
            .await;

        Ok((seller_row, platform_row))
    }

    /// The seller's payout rows, newest first.
    #[instrument(skip(self))]
    pub async fn seller_payouts(&self, seller_id: Uuid) -> Result<Vec<PayoutModel>, ServiceError> {
        let payouts = Payout::find()
            .filter(payout::Column::SellerId.eq(seller_id))
            .filter(payout::Column::Party.eq(PayoutParty::Seller))
            .order_by_desc(payout::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(payouts)
    }

    /// Aggregate payout amounts for the seller dashboard.
    #[instrument(skip(self))]
    pub async fn seller_payout_stats(
        &self,
        seller_id: Uuid,
    ) -> Result<PayoutStats, ServiceError> {
        let payouts = self.seller_payouts(seller_id).await?;

        let mut stats = PayoutStats {
            count: payouts.len() as u64,
            ..PayoutStats::default()
        };
        for p in &payouts {
            stats.total_amount += p.amount;
            if p.is_refunded {
                stats.refunded_amount += p.amount;
            } else if p.is_paid {
                stats.paid_amount += p.amount;
            } else {
                stats.pending_amount += p.amount;
            }
        }
        Ok(stats)
    }
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct PayoutStats {
    pub count: u64,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub refunded_amount: Decimal,
}
