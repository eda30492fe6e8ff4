pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_catalog_tables;
mod m20250301_000002_create_addresses_table;
mod m20250301_000003_create_order_tables;
mod m20250301_000004_create_order_item_statuses_table;
mod m20250301_000005_create_payments_table;
mod m20250301_000006_create_return_tables;
mod m20250301_000007_create_payouts_table;
mod m20250301_000008_add_order_flow_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalog_tables::Migration),
            Box::new(m20250301_000002_create_addresses_table::Migration),
            Box::new(m20250301_000003_create_order_tables::Migration),
            Box::new(m20250301_000004_create_order_item_statuses_table::Migration),
            Box::new(m20250301_000005_create_payments_table::Migration),
            Box::new(m20250301_000006_create_return_tables::Migration),
            Box::new(m20250301_000007_create_payouts_table::Migration),
            Box::new(m20250301_000008_add_order_flow_indexes::Migration),
        ]
    }
}
