//! Copy a monolith database into the catalog and inventory databases.
//! Configured entirely from the environment; see `DataMigrationConfig`.

use configs::DatabaseConfig;
use service::aws::SecretResolver;
use service::data_migration::{self, DataMigrationConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = DataMigrationConfig::from_env()?;
    let connect = |url: &str| {
        let db_cfg = DatabaseConfig::for_url(url);
        async move {
            db_cfg.validate()?;
            models::db::connect_with_config(&db_cfg).await
        }
    };
    let secrets = if cfg.needs_secrets() { Some(SecretResolver::from_env().await) } else { None };
    let catalog_url = cfg.catalog.resolve(secrets.as_ref()).await?;
    let inventory_url = cfg.inventory.resolve(secrets.as_ref()).await?;
    let monolith = connect(&cfg.monolith_url).await?;
    let catalog = connect(&catalog_url).await?;
    let inventory = connect(&inventory_url).await?;

    let report = data_migration::migrate(&cfg, &monolith, &catalog, &inventory).await?;
    info!(
        products = report.products_read,
        products_inserted = report.products_inserted,
        inventory = report.inventory_read,
        inventory_inserted = report.inventory_inserted,
        images = report.images_copied,
        "migration complete"
    );
    Ok(())
}
