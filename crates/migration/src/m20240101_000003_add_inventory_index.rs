use sea_orm_migration::prelude::*;

use crate::m20240101_000002_create_inventory::Inventory;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Inventory: lookups are always by product_id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ix_inventory_product_id")
                    .table(Inventory::Table)
                    .col(Inventory::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("ix_inventory_product_id").table(Inventory::Table).to_owned())
            .await
    }
}
