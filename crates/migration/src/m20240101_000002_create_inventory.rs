//! Create `inventory` table.
//!
//! Stock levels keyed by product id. No FK to `products`: in the split
//! deployment the two tables live in different databases.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inventory::Table)
                    .if_not_exists()
                    .col(pk_auto(Inventory::Id))
                    .col(integer(Inventory::ProductId).not_null())
                    .col(integer(Inventory::Quantity).default(0).not_null())
                    .col(string_len(Inventory::Warehouse, 100).default("main"))
                    .col(
                        timestamp_with_time_zone(Inventory::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Inventory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Inventory { Table, Id, ProductId, Quantity, Warehouse, UpdatedAt }
