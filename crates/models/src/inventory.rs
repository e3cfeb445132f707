use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const DEFAULT_WAREHOUSE: &str = "main";
pub const WAREHOUSE_MAX_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub product_id: i32,
    pub quantity: i32,
    pub warehouse: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation { fn def(&self) -> RelationDef { panic!("no relations") } }

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_quantity(quantity: i32) -> Result<(), errors::ModelError> {
    if quantity < 0 {
        return Err(errors::ModelError::Validation("quantity must be >= 0".into()));
    }
    Ok(())
}

pub fn validate_warehouse(warehouse: &str) -> Result<(), errors::ModelError> {
    if warehouse.trim().is_empty() {
        return Err(errors::ModelError::Validation("warehouse is required".into()));
    }
    if warehouse.chars().count() > WAREHOUSE_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("warehouse must be at most {WAREHOUSE_MAX_LEN} characters")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    quantity: i32,
    warehouse: &str,
) -> Result<Model, errors::ModelError> {
    validate_quantity(quantity)?;
    validate_warehouse(warehouse)?;
    let am = ActiveModel {
        product_id: Set(product_id),
        quantity: Set(quantity),
        warehouse: Set(warehouse.to_string()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// First stock row for a product (rows are per product in practice).
pub async fn find_by_product<C: ConnectionTrait>(db: &C, product_id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::Id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Partial update; `updated_at` is always refreshed.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    found: Model,
    quantity: Option<i32>,
    warehouse: Option<&str>,
) -> Result<Model, errors::ModelError> {
    let mut am: ActiveModel = found.into();
    if let Some(q) = quantity { validate_quantity(q)?; am.quantity = Set(q); }
    if let Some(w) = warehouse { validate_warehouse(w)?; am.warehouse = Set(w.to_string()); }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
