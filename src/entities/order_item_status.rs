use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable entry in an order item's status ledger.
///
/// Rows are append-only: a transition inserts a new event with the next
/// `seq` for the item and never touches earlier rows. The item's current
/// status is the event with the highest `seq`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_item_statuses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_item_id: Uuid,
    pub status: ItemStatus,
    #[sea_orm(nullable)]
    pub shipped_from: Option<String>,
    #[sea_orm(nullable)]
    pub shipped_to: Option<String>,
    /// Per-item sequence number, starting at 1.
    pub seq: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order_item::Entity",
        from = "Column::OrderItemId",
        to = "super::order_item::Column::Id"
    )]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Closed set of order item statuses. Stored and serialized with the
/// human-facing labels ("Return Requested", not "return_requested").
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ItemStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Processing")]
    Processing,
    #[sea_orm(string_value = "Processed")]
    Processed,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
    #[serde(rename = "Return Requested")]
    #[sea_orm(string_value = "Return Requested")]
    #[strum(serialize = "Return Requested")]
    ReturnRequested,
    #[serde(rename = "Return Approved")]
    #[sea_orm(string_value = "Return Approved")]
    #[strum(serialize = "Return Approved")]
    ReturnApproved,
    #[serde(rename = "Return Rejected")]
    #[sea_orm(string_value = "Return Rejected")]
    #[strum(serialize = "Return Rejected")]
    ReturnRejected,
    #[sea_orm(string_value = "Returned")]
    Returned,
    #[sea_orm(string_value = "Refunded")]
    Refunded,
}
