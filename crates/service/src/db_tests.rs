//! Database-backed tests; skipped without `DATABASE_URL` or with `SKIP_DB_TESTS`.

use std::sync::Arc;

use serde_json::{json, Value};
use service_client::{FilePart, FormBody, Invocation, LocalHandler, LogicalService, Method};
use uuid::Uuid;

use crate::catalog::{CatalogService, NewProduct, ProductPatch};
use crate::errors::ServiceError;
use crate::inventory::{InventoryPatch, InventoryService};
use crate::local::{CatalogHandler, InventoryHandler};
use crate::storage::ImageStorage;
use crate::test_support::{get_db, tmp_storage};

#[tokio::test]
async fn product_lifecycle() -> Result<(), anyhow::Error> {
    let Some(db) = get_db().await? else { return Ok(()) };
    let storage = tmp_storage();
    let svc = CatalogService::new(db, storage.clone());

    let name = format!("svc_product_{}", Uuid::new_v4());
    let created = svc
        .create_product(NewProduct {
            name: name.clone(),
            description: "desc".into(),
            price: 12.5,
            image: Some(crate::catalog::ImageUpload {
                filename: "p.png".into(),
                content_type: Some("image/png".into()),
                bytes: vec![7; 4],
            }),
        })
        .await?;
    assert_eq!(created.name, name);
    assert!(created.image_path.starts_with("uploads/") && created.image_path.ends_with(".png"));
    assert_eq!(created.image_url, format!("/static/{}", created.image_path));

    let listed = svc.list_products().await?;
    assert!(listed.iter().any(|p| p.id == created.id));

    let updated = svc.update_product(created.id, ProductPatch { price: Some(15.0), ..Default::default() }).await?;
    assert_eq!(updated.price, 15.0);
    assert_eq!(updated.name, name);

    let msg = svc.delete_product(created.id).await?;
    assert_eq!(msg.message, "Product deleted");
    assert!(matches!(svc.get_product(created.id).await, Err(ServiceError::NotFound(_))));
    let file = storage.upload_dir().join(created.image_path.trim_start_matches("uploads/"));
    assert!(!file.exists());
    Ok(())
}

#[tokio::test]
async fn inventory_defaults_then_upsert() -> Result<(), anyhow::Error> {
    let Some(db) = get_db().await? else { return Ok(()) };
    let svc = InventoryService::new(db);
    // ids this large are never handed out by the sequence in tests
    let pid = 1_000_000 + (Uuid::new_v4().as_u128() % 1_000_000) as i32;

    let empty = svc.get_inventory(pid).await?;
    assert_eq!((empty.quantity, empty.warehouse.as_str(), empty.id), (0, "main", None));

    let created = svc.upsert_inventory(pid, InventoryPatch { quantity: Some(9), warehouse: None }).await?;
    assert_eq!(created.quantity, 9);
    assert_eq!(created.warehouse, "main");

    let moved = svc.upsert_inventory(pid, InventoryPatch { quantity: None, warehouse: Some("east".into()) }).await?;
    assert_eq!(moved.id, created.id);
    assert_eq!(moved.quantity, 9);
    assert_eq!(moved.warehouse, "east");

    let err = svc.upsert_inventory(pid, InventoryPatch { quantity: Some(-3), warehouse: None }).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn handlers_return_service_views() -> Result<(), anyhow::Error> {
    let Some(db) = get_db().await? else { return Ok(()) };
    let storage = tmp_storage();
    let catalog = CatalogService::new(db.clone(), storage as Arc<dyn ImageStorage>);
    let handler = CatalogHandler::new(catalog.clone());

    let form = FormBody::new()
        .field("name", format!("svc_handler_{}", Uuid::new_v4()))
        .field("price", "3.25")
        .file(FilePart { field: "image".into(), filename: String::new(), content_type: None, bytes: vec![] });
    let inv = Invocation::new(LogicalService::Catalog, Method::Post, "/products").form(form);
    let created = handler.handle(&inv).await.map_err(|e| anyhow::anyhow!(e))?;
    let id = created["id"].as_i64().unwrap_or_default() as i32;
    assert_eq!(created["image_url"], "");

    let via_handler = handler
        .handle(&Invocation::new(LogicalService::Catalog, Method::Get, format!("/products/{id}")))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    let direct = serde_json::to_value(catalog.get_product(id).await?)?;
    assert_eq!(via_handler, direct);

    let missing = handler
        .handle(&Invocation::new(LogicalService::Catalog, Method::Get, "/products/not-a-number"))
        .await
        .unwrap_err();
    assert!(matches!(missing.downcast_ref::<ServiceError>(), Some(ServiceError::NotFound(_))));

    let inventory = InventoryHandler::new(InventoryService::new(db));
    let put = Invocation::new(LogicalService::Inventory, Method::Put, format!("/inventory/{id}"))
        .json(json!({"quantity": 4, "warehouse": "main"}));
    let stock: Value = inventory.handle(&put).await.map_err(|e| anyhow::anyhow!(e))?;
    assert_eq!(stock["quantity"], 4);
    assert_eq!(stock["product_id"], id);

    handler
        .handle(&Invocation::new(LogicalService::Catalog, Method::Delete, format!("/products/{id}")))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
