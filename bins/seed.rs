use std::path::PathBuf;

use clap::Parser;
use configs::{AppConfig, DatabaseConfig};
use service::seed::{self, SeedOptions, SeedTarget};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Load the sample products and stock levels into an empty database")]
struct Cli {
    /// Database layout to seed: monolith, catalog or inventory
    #[arg(long)]
    target: SeedTarget,
    /// Directory holding the sample product images
    #[arg(long)]
    images_dir: Option<PathBuf>,
    /// Overrides `database.url` / `DATABASE_URL`
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();
    let cli = Cli::parse();

    let cfg = AppConfig::load_and_validate()?;
    let db_cfg = match cli.database_url {
        Some(url) => {
            let db_cfg = DatabaseConfig { url, secret: None, ..cfg.database.clone() };
            db_cfg.validate()?;
            db_cfg
        }
        None => service::aws::resolve_database(&cfg.database).await?,
    };
    let db = models::db::connect_with_config(&db_cfg).await?;

    seed::run_migrations(&db, cli.target).await?;
    let opts = SeedOptions { images_dir: cli.images_dir, upload_dir: PathBuf::from(cfg.storage.upload_dir()) };
    let report = seed::seed(&db, cli.target, &opts).await?;
    if report.skipped {
        info!(target = %cli.target, "database already has data; nothing seeded");
    } else {
        info!(
            target = %cli.target,
            products = report.products,
            inventory = report.inventory,
            images = report.images,
            "seeded sample data"
        );
    }
    Ok(())
}
