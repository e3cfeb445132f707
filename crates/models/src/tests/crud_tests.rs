use crate::{inventory, product};
use sea_orm::{EntityTrait, TransactionTrait};
use anyhow::Result;

use super::test_db;

/// Test product create/read/list/delete
#[tokio::test]
async fn test_product_crud() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let txn = db.begin().await?;

    let created = product::create(&txn, "Laptop Stand", "Adjustable aluminum stand.", 34.99, "").await?;
    assert!(created.id > 0);
    assert_eq!(created.name, "Laptop Stand");
    assert_eq!(created.image_path, "");

    let found = product::find(&txn, created.id).await?.expect("product exists");
    assert_eq!(found, created);

    let newer = product::create(&txn, "Webcam HD", "", 59.99, "uploads/a.jpg").await?;
    let listed = product::list_newest_first(&txn).await?;
    let pos_new = listed.iter().position(|p| p.id == newer.id).unwrap();
    let pos_old = listed.iter().position(|p| p.id == created.id).unwrap();
    assert!(pos_new < pos_old, "newest product should come first");

    product::Entity::delete_by_id(created.id).exec(&txn).await?;
    assert!(product::find(&txn, created.id).await?.is_none());

    txn.rollback().await?;
    Ok(())
}

/// `get` reports a missing row as NotFound, not as a database error
#[tokio::test]
async fn test_product_get_missing() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let txn = db.begin().await?;
    let created = product::create(&txn, "Desk Mat", "", 12.0, "").await?;
    assert_eq!(product::get(&txn, created.id).await?.id, created.id);
    product::Entity::delete_by_id(created.id).exec(&txn).await?;
    let err = product::get(&txn, created.id).await.unwrap_err();
    assert!(matches!(err, crate::errors::ModelError::NotFound { entity: "Product", .. }));
    txn.rollback().await?;
    Ok(())
}

/// Invalid input never reaches the database
#[tokio::test]
async fn test_product_validation() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let err = product::create(&db, "", "", 1.0, "").await.unwrap_err();
    assert!(matches!(err, crate::errors::ModelError::Validation(_)));
    let err = product::create(&db, "ok", "", -5.0, "").await.unwrap_err();
    assert!(matches!(err, crate::errors::ModelError::Validation(_)));
    Ok(())
}

/// Test inventory create, lookup by product and partial update
#[tokio::test]
async fn test_inventory_crud() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let txn = db.begin().await?;

    let product_id = 900_000 + (std::process::id() as i32 % 1000);
    let created = inventory::create(&txn, product_id, 50, inventory::DEFAULT_WAREHOUSE).await?;
    assert_eq!(created.quantity, 50);

    let found = inventory::find_by_product(&txn, product_id).await?.expect("row exists");
    assert_eq!(found.id, created.id);

    let updated = inventory::update(&txn, found, Some(7), None).await?;
    assert_eq!(updated.quantity, 7);
    assert_eq!(updated.warehouse, "main");
    assert!(updated.updated_at >= created.updated_at);

    let updated = inventory::update(&txn, updated, None, Some("east")).await?;
    assert_eq!(updated.quantity, 7);
    assert_eq!(updated.warehouse, "east");

    assert!(inventory::update(&txn, updated, Some(-1), None).await.is_err());

    txn.rollback().await?;
    Ok(())
}
