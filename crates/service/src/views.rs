//! JSON shapes returned by the catalog and inventory APIs.
//!
//! Both the HTTP routes and the in-process handlers serialize these, so a
//! caller gets the same document whichever way a call was dispatched.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use models::{inventory, product};

use crate::storage::ImageStorage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_path: String,
    pub image_url: String,
    pub created_at: DateTime<FixedOffset>,
}

impl ProductView {
    pub fn from_model(m: product::Model, storage: &dyn ImageStorage) -> Self {
        let image_url = storage.url_for(&m.image_path);
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            image_path: m.image_path,
            image_url,
            created_at: m.created_at,
        }
    }
}

/// Stock for a product. Products with no stock row yet report zero in the
/// default warehouse and carry no `id`/`updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub product_id: i32,
    pub quantity: i32,
    pub warehouse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl InventoryView {
    pub fn empty(product_id: i32) -> Self {
        Self {
            id: None,
            product_id,
            quantity: 0,
            warehouse: inventory::DEFAULT_WAREHOUSE.to_string(),
            updated_at: None,
        }
    }
}

impl From<inventory::Model> for InventoryView {
    fn from(m: inventory::Model) -> Self {
        Self {
            id: Some(m.id),
            product_id: m.product_id,
            quantity: m.quantity,
            warehouse: m.warehouse,
            updated_at: Some(m.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_inventory_omits_row_fields() {
        let v = serde_json::to_value(InventoryView::empty(4)).unwrap();
        assert_eq!(v, json!({"product_id": 4, "quantity": 0, "warehouse": "main"}));
    }

    #[test]
    fn stored_inventory_has_all_fields() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap();
        let m = inventory::Model { id: 9, product_id: 4, quantity: 12, warehouse: "east".into(), updated_at: ts };
        let v = serde_json::to_value(InventoryView::from(m)).unwrap();
        assert_eq!(v["id"], 9);
        assert_eq!(v["quantity"], 12);
        assert!(v["updated_at"].as_str().unwrap().starts_with("2024-03-01T10:00:00"));
    }
}
