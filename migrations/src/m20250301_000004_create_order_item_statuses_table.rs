use sea_orm_migration::prelude::*;

use super::m20250301_000003_create_order_tables::OrderItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderItemStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItemStatuses::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderItemStatuses::OrderItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrderItemStatuses::Status)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderItemStatuses::ShippedFrom).string().null())
                    .col(ColumnDef::new(OrderItemStatuses::ShippedTo).string().null())
                    .col(ColumnDef::new(OrderItemStatuses::Seq).integer().not_null())
                    .col(
                        ColumnDef::new(OrderItemStatuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_item_statuses_order_item_id")
                            .from(OrderItemStatuses::Table, OrderItemStatuses::OrderItemId)
                            .to(OrderItems::Table, OrderItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One seq per item; also backs the derived-current lookup.
        manager
            .create_index(
                Index::create()
                    .name("idx_order_item_statuses_item_seq")
                    .table(OrderItemStatuses::Table)
                    .col(OrderItemStatuses::OrderItemId)
                    .col(OrderItemStatuses::Seq)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItemStatuses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrderItemStatuses {
    Table,
    Id,
    OrderItemId,
    Status,
    ShippedFrom,
    ShippedTo,
    Seq,
    CreatedAt,
}
