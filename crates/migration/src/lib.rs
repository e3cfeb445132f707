//! Migrators for the three database layouts.
//!
//! The monolith keeps both tables in one database; the split deployment
//! gives catalog and inventory a database each. Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_products;
mod m20240101_000002_create_inventory;
mod m20240101_000003_add_inventory_index;

/// Monolith database: products and inventory.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products::Migration),
            Box::new(m20240101_000002_create_inventory::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000003_add_inventory_index::Migration),
        ]
    }
}

/// Catalog service database.
pub struct CatalogMigrator;

#[async_trait::async_trait]
impl MigratorTrait for CatalogMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_products::Migration)]
    }
}

/// Inventory service database.
pub struct InventoryMigrator;

#[async_trait::async_trait]
impl MigratorTrait for InventoryMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000002_create_inventory::Migration),
            Box::new(m20240101_000003_add_inventory_index::Migration),
        ]
    }
}
