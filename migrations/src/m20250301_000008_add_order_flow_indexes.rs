use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Hot paths: open-cart lookup, seller order listing, payment/payout joins.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_open")
                    .table(Alias::new("orders"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("is_ordered"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_user_open")
                    .table(Alias::new("order_items"))
                    .col(Alias::new("user_id"))
                    .col(Alias::new("is_ordered"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_product")
                    .table(Alias::new("order_items"))
                    .col(Alias::new("product_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_order_item")
                    .table(Alias::new("payments"))
                    .col(Alias::new("order_item_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payouts_seller")
                    .table(Alias::new("payouts"))
                    .col(Alias::new("seller_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_return_requests_order_item")
                    .table(Alias::new("return_requests"))
                    .col(Alias::new("order_item_id"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_return_requests_order_item",
            "idx_payouts_seller",
            "idx_payments_order_item",
            "idx_order_items_product",
            "idx_order_items_user_open",
            "idx_orders_user_open",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}
