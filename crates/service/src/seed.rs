//! Sample data for a fresh database.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use migration::{CatalogMigrator, InventoryMigrator, Migrator, MigratorTrait};
use models::{inventory, product};
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use tokio::fs;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::unique_filename;

/// Which database layout is being seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTarget {
    /// Products and their stock in one database.
    Monolith,
    Catalog,
    /// Stock only, for product ids `1..=5`.
    Inventory,
}

impl SeedTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedTarget::Monolith => "monolith",
            SeedTarget::Catalog => "catalog",
            SeedTarget::Inventory => "inventory",
        }
    }
}

impl fmt::Display for SeedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monolith" => Ok(SeedTarget::Monolith),
            "catalog" => Ok(SeedTarget::Catalog),
            "inventory" => Ok(SeedTarget::Inventory),
            other => Err(format!("unknown seed target {other:?} (expected monolith, catalog or inventory)")),
        }
    }
}

pub struct SeedProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub image: &'static str,
}

pub const PRODUCTS: [SeedProduct; 5] = [
    SeedProduct {
        name: "Wireless Headphones",
        description: "Noise-cancelling over-ear headphones with 30hr battery life.",
        price: 79.99,
        image: "headphones.jpg",
    },
    SeedProduct {
        name: "Mechanical Keyboard",
        description: "RGB mechanical keyboard with Cherry MX switches.",
        price: 129.99,
        image: "keyboard.jpg",
    },
    SeedProduct {
        name: "USB-C Hub",
        description: "7-in-1 USB-C hub with HDMI, USB 3.0, and SD card reader.",
        price: 49.99,
        image: "usb-hub.jpg",
    },
    SeedProduct {
        name: "Laptop Stand",
        description: "Adjustable aluminum laptop stand for ergonomic viewing.",
        price: 34.99,
        image: "laptop-stand.jpg",
    },
    SeedProduct {
        name: "Webcam HD",
        description: "1080p webcam with built-in microphone and auto-focus.",
        price: 59.99,
        image: "webcam.jpg",
    },
];

/// Units in the default warehouse, index-aligned with [`PRODUCTS`].
pub const STOCK: [i32; 5] = [50, 30, 100, 75, 45];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Source of the sample images; missing files are skipped.
    pub images_dir: Option<PathBuf>,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub skipped: bool,
    pub products: usize,
    pub inventory: usize,
    pub images: usize,
}

/// Bring the target's schema up to date.
pub async fn run_migrations(db: &DatabaseConnection, target: SeedTarget) -> Result<(), ServiceError> {
    let res = match target {
        SeedTarget::Monolith => Migrator::up(db, None).await,
        SeedTarget::Catalog => CatalogMigrator::up(db, None).await,
        SeedTarget::Inventory => InventoryMigrator::up(db, None).await,
    };
    res.map_err(|e| ServiceError::Db(e.to_string()))
}

async fn has_data(db: &DatabaseConnection, target: SeedTarget) -> Result<bool, ServiceError> {
    let found = match target {
        SeedTarget::Monolith | SeedTarget::Catalog => product::Entity::find().one(db).await?.is_some(),
        SeedTarget::Inventory => inventory::Entity::find().one(db).await?.is_some(),
    };
    Ok(found)
}

/// Copy one sample image under a fresh name; `None` when the source is absent.
async fn copy_seed_image(opts: &SeedOptions, image: &str) -> Result<Option<String>, ServiceError> {
    let Some(dir) = &opts.images_dir else { return Ok(None) };
    let src = dir.join(image);
    if !path_exists(&src).await {
        warn!(path = %src.display(), "seed image missing; product gets no image");
        return Ok(None);
    }
    let dest = unique_filename(image);
    fs::copy(&src, opts.upload_dir.join(&dest))
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?;
    Ok(Some(format!("uploads/{dest}")))
}

async fn path_exists(p: &Path) -> bool {
    fs::metadata(p).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Insert the sample rows unless the target already holds data.
pub async fn seed(db: &DatabaseConnection, target: SeedTarget, opts: &SeedOptions) -> Result<SeedReport, ServiceError> {
    if has_data(db, target).await? {
        info!(%target, "database already has data; skipping seed");
        return Ok(SeedReport { skipped: true, ..Default::default() });
    }

    let mut report = SeedReport::default();
    if target == SeedTarget::Inventory {
        let txn = db.begin().await?;
        for (i, qty) in STOCK.iter().enumerate() {
            inventory::create(&txn, i as i32 + 1, *qty, inventory::DEFAULT_WAREHOUSE).await?;
            report.inventory += 1;
        }
        txn.commit().await?;
        info!(records = report.inventory, "seeded inventory");
        return Ok(report);
    }

    if opts.images_dir.is_some() {
        fs::create_dir_all(&opts.upload_dir)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }

    let txn = db.begin().await?;
    for (p, qty) in PRODUCTS.iter().zip(STOCK) {
        let image_path = match copy_seed_image(opts, p.image).await? {
            Some(path) => {
                report.images += 1;
                path
            }
            None => String::new(),
        };
        let created = product::create(&txn, p.name, p.description, p.price, &image_path).await?;
        report.products += 1;
        if target == SeedTarget::Monolith {
            inventory::create(&txn, created.id, qty, inventory::DEFAULT_WAREHOUSE).await?;
            report.inventory += 1;
        }
    }
    txn.commit().await?;
    info!(%target, products = report.products, inventory = report.inventory, images = report.images, "seed complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parsing() {
        assert_eq!("Catalog".parse::<SeedTarget>().unwrap(), SeedTarget::Catalog);
        assert_eq!(" inventory ".parse::<SeedTarget>().unwrap(), SeedTarget::Inventory);
        assert!("frontend".parse::<SeedTarget>().is_err());
    }

    #[test]
    fn stock_lines_up_with_products() {
        assert_eq!(PRODUCTS.len(), STOCK.len());
        assert_eq!(STOCK, [50, 30, 100, 75, 45]);
    }

    #[tokio::test]
    async fn missing_images_dir_copies_nothing() {
        let opts = SeedOptions { images_dir: None, upload_dir: std::env::temp_dir() };
        assert_eq!(copy_seed_image(&opts, "webcam.jpg").await.unwrap(), None);

        let opts = SeedOptions {
            images_dir: Some(std::env::temp_dir().join(format!("no_such_dir_{}", uuid::Uuid::new_v4()))),
            upload_dir: std::env::temp_dir(),
        };
        assert_eq!(copy_seed_image(&opts, "webcam.jpg").await.unwrap(), None);
    }
}
