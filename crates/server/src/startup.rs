use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, ServicesConfig};
use migration::{CatalogMigrator, InventoryMigrator, Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use service::{
    catalog::CatalogService,
    inventory::InventoryService,
    local::{CatalogHandler, InventoryHandler},
    storage::{self, ImageStorage},
};
use service_client::{ClientError, LogicalService, ServiceClient, ServiceEndpoints};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, catalog, frontend, inventory};

pub const FRONTEND_DIR: &str = "frontend";
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8001";
pub const DEFAULT_INVENTORY_URL: &str = "http://localhost:8002";

/// What a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Monolith,
    Catalog,
    Inventory,
    Frontend,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Monolith => "monolith",
            Role::Catalog => "catalog",
            Role::Inventory => "inventory",
            Role::Frontend => "frontend",
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn timeout(cfg: &ServicesConfig) -> Option<Duration> {
    cfg.request_timeout_secs.map(Duration::from_secs)
}

/// Connect and bring the schema the role owns up to date.
async fn connect_db(cfg: &AppConfig, role: Role) -> Result<DatabaseConnection, StartupError> {
    let db_cfg = service::aws::resolve_database(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    db_cfg.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let db = models::db::connect_with_config(&db_cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    let migrated = match role {
        Role::Catalog => CatalogMigrator::up(&db, None).await,
        Role::Inventory => InventoryMigrator::up(&db, None).await,
        Role::Monolith | Role::Frontend => Migrator::up(&db, None).await,
    };
    migrated.map_err(|e| StartupError::Database(e.to_string()))?;
    Ok(db)
}

async fn image_storage(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ImageStorage>> {
    if cfg.storage.object_store_bucket().is_none() {
        common::env::ensure_upload_dir(&cfg.storage.upload_dir()).await?;
    }
    Ok(storage::from_config(&cfg.storage).await)
}

/// Client for the monolith: services with a configured address are called
/// over HTTP, the rest in-process.
pub fn monolith_client(
    cfg: &ServicesConfig,
    catalog: CatalogService,
    inventory: InventoryService,
) -> Result<ServiceClient, ClientError> {
    ServiceClient::builder(ServiceEndpoints::from(cfg))
        .local(LogicalService::Catalog, Arc::new(CatalogHandler::new(catalog)))
        .local(LogicalService::Inventory, Arc::new(InventoryHandler::new(inventory)))
        .timeout(timeout(cfg))
        .build()
}

/// Client for the standalone frontend: everything remote, with localhost
/// defaults for unset addresses.
pub fn frontend_client(cfg: &ServicesConfig) -> Result<ServiceClient, ClientError> {
    let cfg = cfg.clone().with_defaults(DEFAULT_CATALOG_URL, DEFAULT_INVENTORY_URL);
    ServiceClient::builder(ServiceEndpoints::from(&cfg)).timeout(timeout(&cfg)).build()
}

/// Build the router for `role`, connecting to the database when the role
/// owns one.
pub async fn build_app(cfg: &AppConfig, role: Role) -> anyhow::Result<Router> {
    let app = match role {
        Role::Monolith => {
            let db = connect_db(cfg, role).await?;
            let catalog_svc = CatalogService::new(db.clone(), image_storage(cfg).await?);
            let inventory_svc = InventoryService::new(db.clone());
            let client = monolith_client(&cfg.services, catalog_svc.clone(), inventory_svc.clone())
                .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            info!(?client, "service bindings");
            common::env::check_frontend_dir(FRONTEND_DIR).await;
            routes::ops_router(Some(db))
                .merge(catalog::router(catalog_svc))
                .merge(inventory::router(inventory_svc))
                .merge(routes::static_router(&cfg.storage.static_dir))
                .merge(frontend::router(client, FRONTEND_DIR))
        }
        Role::Catalog => {
            let db = connect_db(cfg, role).await?;
            let svc = CatalogService::new(db.clone(), image_storage(cfg).await?);
            routes::ops_router(Some(db))
                .merge(catalog::router(svc))
                .merge(routes::static_router(&cfg.storage.static_dir))
        }
        Role::Inventory => {
            let db = connect_db(cfg, role).await?;
            routes::ops_router(Some(db.clone())).merge(inventory::router(InventoryService::new(db)))
        }
        Role::Frontend => {
            let client = frontend_client(&cfg.services).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            info!(?client, "service bindings");
            common::env::check_frontend_dir(FRONTEND_DIR).await;
            routes::ops_router(None).merge(frontend::router(client, FRONTEND_DIR))
        }
    };
    Ok(routes::with_tracing(app.layer(build_cors())))
}

/// Public entry: load config, build the role's app and serve it.
pub async fn run(role: Role) -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()?;
    let app = build_app(&cfg, role).await?;

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.server.bind_addr())))?;
    info!(%addr, role = role.as_str(), "starting http server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
