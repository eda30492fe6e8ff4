use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_catalog_tables::Sellers;
use super::m20250301_000003_create_order_tables::OrderItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payouts::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Payouts::PayoutNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payouts::OrderItemId).uuid().not_null())
                    .col(ColumnDef::new(Payouts::Party).string_len(10).not_null())
                    .col(ColumnDef::new(Payouts::SellerId).uuid().null())
                    .col(ColumnDef::new(Payouts::Amount).decimal().not_null())
                    .col(
                        ColumnDef::new(Payouts::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Payouts::IsRefunded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Payouts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payouts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payouts_order_item_id")
                            .from(Payouts::Table, Payouts::OrderItemId)
                            .to(OrderItems::Table, OrderItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payouts_seller_id")
                            .from(Payouts::Table, Payouts::SellerId)
                            .to(Sellers::Table, Sellers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payouts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payouts {
    Table,
    Id,
    PayoutNumber,
    OrderItemId,
    Party,
    SellerId,
    Amount,
    IsPaid,
    IsRefunded,
    CreatedAt,
    UpdatedAt,
}
