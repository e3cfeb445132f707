//! Stock levels per product.

use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::{debug, instrument};

use models::inventory;

use crate::errors::ServiceError;
use crate::views::InventoryView;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InventoryPatch {
    pub quantity: Option<i32>,
    pub warehouse: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    db: DatabaseConnection,
}

impl InventoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_inventory(&self) -> Result<Vec<InventoryView>, ServiceError> {
        let rows = inventory::list(&self.db).await?;
        Ok(rows.into_iter().map(InventoryView::from).collect())
    }

    /// Never fails with not-found: a product without a stock row has zero
    /// units in the default warehouse.
    pub async fn get_inventory(&self, product_id: i32) -> Result<InventoryView, ServiceError> {
        Ok(inventory::find_by_product(&self.db, product_id)
            .await?
            .map(InventoryView::from)
            .unwrap_or_else(|| InventoryView::empty(product_id)))
    }

    /// Creates the row on first write, filling unset fields with defaults.
    #[instrument(skip(self, patch))]
    pub async fn upsert_inventory(&self, product_id: i32, patch: InventoryPatch) -> Result<InventoryView, ServiceError> {
        let row = match inventory::find_by_product(&self.db, product_id).await? {
            Some(found) => inventory::update(&self.db, found, patch.quantity, patch.warehouse.as_deref()).await?,
            None => {
                debug!(product_id, "no stock row yet; creating one");
                inventory::create(
                    &self.db,
                    product_id,
                    patch.quantity.unwrap_or(0),
                    patch.warehouse.as_deref().unwrap_or(inventory::DEFAULT_WAREHOUSE),
                )
                .await?
            }
        };
        Ok(row.into())
    }
}
