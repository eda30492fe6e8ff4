use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Addresses::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Addresses::AddressType)
                            .string_len(10)
                            .not_null()
                            .default("home"),
                    )
                    .col(ColumnDef::new(Addresses::StreetAddress).string().not_null())
                    .col(ColumnDef::new(Addresses::Apartment).string().null())
                    .col(ColumnDef::new(Addresses::City).string().not_null())
                    .col(ColumnDef::new(Addresses::State).string().not_null())
                    .col(ColumnDef::new(Addresses::PostalCode).string().not_null())
                    .col(
                        ColumnDef::new(Addresses::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Addresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Addresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_user_id")
                    .table(Addresses::Table)
                    .col(Addresses::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Addresses {
    Table,
    Id,
    UserId,
    AddressType,
    StreetAddress,
    Apartment,
    City,
    State,
    PostalCode,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}
