//! Local and remote dispatch against real catalog/inventory servers.
//! Skipped without `DATABASE_URL` or with `SKIP_DB_TESTS`.

use std::sync::Arc;

use migration::MigratorTrait;
use serde_json::json;
use service::catalog::CatalogService;
use service::inventory::InventoryService;
use service::local::{CatalogHandler, InventoryHandler};
use service::storage::LocalStorage;
use service_client::{ClientError, FormBody, LogicalService, Mode, ServiceClient, ServiceEndpoints};
use tokio::net::TcpListener;
use uuid::Uuid;

use server::routes::{catalog, inventory};

struct Clients {
    local: ServiceClient,
    remote: ServiceClient,
}

async fn spawn(app: axum::Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(format!("http://{}", addr))
}

async fn setup() -> anyhow::Result<Option<Clients>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing or SKIP_DB_TESTS set; skip e2e tests");
        return Ok(None);
    }
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let storage = Arc::new(LocalStorage::new(std::env::temp_dir().join(format!("ecomm_e2e_{}", Uuid::new_v4()))));
    let catalog_svc = CatalogService::new(db.clone(), storage);
    let inventory_svc = InventoryService::new(db);

    let catalog_url = spawn(catalog::router(catalog_svc.clone())).await?;
    let inventory_url = spawn(inventory::router(inventory_svc.clone())).await?;

    let local = ServiceClient::builder(ServiceEndpoints::new())
        .local(LogicalService::Catalog, Arc::new(CatalogHandler::new(catalog_svc)))
        .local(LogicalService::Inventory, Arc::new(InventoryHandler::new(inventory_svc)))
        .build()?;
    let remote = ServiceClient::builder(
        ServiceEndpoints::new()
            .with(LogicalService::Catalog, catalog_url)
            .with(LogicalService::Inventory, inventory_url),
    )
    .build()?;
    Ok(Some(Clients { local, remote }))
}

#[tokio::test]
async fn both_modes_return_the_same_documents() -> anyhow::Result<()> {
    let Some(c) = setup().await? else { return Ok(()) };
    assert_eq!(c.local.mode(LogicalService::Catalog), Some(Mode::Local));
    assert_eq!(c.remote.mode(LogicalService::Catalog), Some(Mode::Remote));

    let form = FormBody::new().field("name", format!("e2e_{}", Uuid::new_v4())).field("price", "19.99");
    let created = c.remote.post_form("catalog", "/products", form).await?;
    let id = created["id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let path = format!("/products/{id}");
    assert_eq!(c.local.get("catalog", &path).await?, c.remote.get("catalog", &path).await?);

    let stock = json!({"quantity": 3, "warehouse": "main"});
    c.local.put("inventory", &format!("/inventory/{id}"), stock).await?;
    let inv_path = format!("/inventory/{id}");
    let local_stock = c.local.get("inventory", &inv_path).await?;
    assert_eq!(local_stock, c.remote.get("inventory", &inv_path).await?);
    assert_eq!(local_stock["quantity"], 3);

    let deleted = c.remote.delete("catalog", &path).await?;
    assert_eq!(deleted, json!({"message": "Product deleted"}));
    Ok(())
}

#[tokio::test]
async fn missing_product_fails_in_both_modes() -> anyhow::Result<()> {
    let Some(c) = setup().await? else { return Ok(()) };
    let path = "/products/2147483647";

    let remote = c.remote.get("catalog", path).await.unwrap_err();
    assert_eq!(remote.status(), Some(404));

    let local = c.local.get("catalog", path).await.unwrap_err();
    assert!(matches!(
        local.downcast_local::<service::errors::ServiceError>(),
        Some(service::errors::ServiceError::NotFound(_))
    ));

    let unknown = c.remote.get("billing", "/invoices").await.unwrap_err();
    assert!(matches!(unknown, ClientError::Configuration(_)));
    Ok(())
}

#[tokio::test]
async fn validation_errors_surface_as_400() -> anyhow::Result<()> {
    let Some(c) = setup().await? else { return Ok(()) };
    let form = FormBody::new().field("name", "no price");
    let err = c.remote.post_form("catalog", "/products", form).await.unwrap_err();
    match err {
        ClientError::RemoteCall { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("name and price are required"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn inventory_role_serves_health_and_api() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(());
    }
    let mut cfg = configs::AppConfig::default();
    cfg.database.url = models::db::DATABASE_URL.clone();
    let app = server::startup::build_app(&cfg, server::Role::Inventory).await?;
    let base = spawn(app).await?;

    let http = reqwest::Client::new();
    let health = http.get(format!("{base}/health")).send().await?;
    assert_eq!(health.status(), 200);
    let stock: serde_json::Value = http.get(format!("{base}/api/inventory/2147483646")).send().await?.json().await?;
    assert_eq!(stock["quantity"], 0);
    assert_eq!(stock["warehouse"], "main");
    Ok(())
}
