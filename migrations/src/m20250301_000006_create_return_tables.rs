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
                    .table(ReturnRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReturnRequests::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReturnRequests::OrderItemId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReturnRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(ReturnRequests::Reason).string().not_null())
                    .col(ColumnDef::new(ReturnRequests::Description).text().null())
                    .col(
                        ColumnDef::new(ReturnRequests::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReturnRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReturnRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_return_requests_order_item_id")
                            .from(ReturnRequests::Table, ReturnRequests::OrderItemId)
                            .to(OrderItems::Table, OrderItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReturnRequestStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReturnRequestStatuses::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReturnRequestStatuses::ReturnRequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReturnRequestStatuses::Status)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReturnRequestStatuses::Reason).string().null())
                    .col(
                        ColumnDef::new(ReturnRequestStatuses::Seq)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReturnRequestStatuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_return_request_statuses_return_request_id")
                            .from(
                                ReturnRequestStatuses::Table,
                                ReturnRequestStatuses::ReturnRequestId,
                            )
                            .to(ReturnRequests::Table, ReturnRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_return_request_statuses_request_seq")
                    .table(ReturnRequestStatuses::Table)
                    .col(ReturnRequestStatuses::ReturnRequestId)
                    .col(ReturnRequestStatuses::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Refunds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Refunds::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Refunds::ReturnRequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Refunds::Amount).decimal().not_null())
                    .col(ColumnDef::new(Refunds::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Refunds::TransactionId).string().not_null())
                    .col(
                        ColumnDef::new(Refunds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_refunds_return_request_id")
                            .from(Refunds::Table, Refunds::ReturnRequestId)
                            .to(ReturnRequests::Table, ReturnRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Refunds::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ReturnRequestStatuses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(ReturnRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReturnRequests {
    Table,
    Id,
    OrderItemId,
    UserId,
    Reason,
    Description,
    IsApproved,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReturnRequestStatuses {
    Table,
    Id,
    ReturnRequestId,
    Status,
    Reason,
    Seq,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Refunds {
    Table,
    Id,
    ReturnRequestId,
    Amount,
    PaymentMethod,
    TransactionId,
    CreatedAt,
}
