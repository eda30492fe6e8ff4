use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product line in a user's cart or order.
///
/// Created unordered (a cart line, mutable in place), frozen at checkout
/// (`is_ordered = true`), after which its lifecycle is tracked by the
/// append-only `order_item_statuses` ledger. There is no current-status
/// column: the current status is the ledger event with the highest
/// sequence number.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// External identifier, `ITM-…`.
    #[sea_orm(unique)]
    pub item_number: String,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub is_ordered: bool,
    #[sea_orm(nullable)]
    pub shipping_address_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub payment_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub refund_id: Option<Uuid>,
    /// Mutable, unversioned shipping details recorded at the Shipped
    /// transition.
    #[sea_orm(nullable)]
    pub courier: Option<String>,
    #[sea_orm(nullable)]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::address::Entity",
        from = "Column::ShippingAddressId",
        to = "super::address::Column::Id"
    )]
    ShippingAddress,
    #[sea_orm(has_many = "super::order_item_status::Entity")]
    StatusEvents,
    #[sea_orm(has_many = "super::return_request::Entity")]
    ReturnRequests,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::payout::Entity")]
    Payouts,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShippingAddress.def()
    }
}

impl Related<super::order_item_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusEvents.def()
    }
}

impl Related<super::return_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReturnRequests.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_item_variant::Relation::Variant.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_item_variant::Relation::OrderItem.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
