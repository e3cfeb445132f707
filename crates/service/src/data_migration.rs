//! One-shot copy of a monolith database into the catalog and inventory
//! databases, plus the uploaded images (to a directory or an S3 bucket).

use std::path::{Path, PathBuf};

use aws_sdk_s3::primitives::ByteStream;
use configs::SecretRef;
use migration::{CatalogMigrator, InventoryMigrator, MigratorTrait};
use models::{inventory, product};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tokio::fs;
use tracing::{info, warn};

use crate::aws::SecretResolver;
use crate::errors::ServiceError;
use crate::storage::s3::{object_key, storage_error};
use crate::storage::{guess_content_type, S3Storage};

pub const DEFAULT_UPLOADS_SRC: &str = "static/uploads";
pub const DEFAULT_UPLOADS_DST: &str = "catalog/static/uploads";
/// Rows per INSERT; keeps each statement far below Postgres's 65535 bind
/// parameters (products use 6 per row).
pub const INSERT_CHUNK: usize = 1_000;

/// Where a target database is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDb {
    Url(String),
    Secret(SecretRef),
}

impl TargetDb {
    /// `<PREFIX>_DATABASE_URL`, else `<PREFIX>_DB_SECRET` with `<PREFIX>_DB_NAME`.
    fn from_lookup<F: Fn(&str) -> Option<String>>(prefix: &str, lookup: &F) -> Result<Option<Self>, ServiceError> {
        let get = |k: String| lookup(&k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(url) = get(format!("{prefix}_DATABASE_URL")) {
            return Ok(Some(Self::Url(url)));
        }
        let Some(secret_name) = get(format!("{prefix}_DB_SECRET")) else {
            return Ok(None);
        };
        match SecretRef::from_parts(Some(secret_name), get(format!("{prefix}_DB_NAME"))) {
            Some(secret) => Ok(Some(Self::Secret(secret))),
            None => Err(ServiceError::Validation(format!(
                "{prefix}_DB_NAME is required when {prefix}_DB_SECRET is set"
            ))),
        }
    }

    /// The connection URL, fetching credentials when this names a secret.
    pub async fn resolve(&self, secrets: Option<&SecretResolver>) -> Result<String, ServiceError> {
        match (self, secrets) {
            (Self::Url(url), _) => Ok(url.clone()),
            (Self::Secret(secret), Some(secrets)) => secrets.database_url(secret).await,
            (Self::Secret(secret), None) => Err(ServiceError::Internal(format!(
                "{}: no Secrets Manager client to read the secret with",
                secret.secret_name
            ))),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataMigrationConfig {
    pub monolith_url: String,
    pub catalog: TargetDb,
    pub inventory: TargetDb,
    pub uploads_src: PathBuf,
    pub uploads_dst: PathBuf,
    /// Upload images here instead of copying them to `uploads_dst`.
    pub target_s3_bucket: Option<String>,
}

impl DataMigrationConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Reads `MONOLITH_DATABASE_URL` (defaults to the local database), the
    /// catalog and inventory targets (a URL or a secret, both required),
    /// `UPLOADS_SRC`, `UPLOADS_DST` and `TARGET_S3_BUCKET`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ServiceError> {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let catalog = TargetDb::from_lookup("CATALOG", &lookup)?;
        let inventory = TargetDb::from_lookup("INVENTORY", &lookup)?;
        let (Some(catalog), Some(inventory)) = (catalog, inventory) else {
            return Err(ServiceError::Validation(
                "catalog and inventory databases must be provided: set CATALOG_DATABASE_URL and INVENTORY_DATABASE_URL, \
                 or CATALOG_DB_SECRET/CATALOG_DB_NAME and INVENTORY_DB_SECRET/INVENTORY_DB_NAME"
                    .into(),
            ));
        };
        Ok(Self {
            monolith_url: get("MONOLITH_DATABASE_URL").unwrap_or_else(|| configs::DEFAULT_DATABASE_URL.to_string()),
            catalog,
            inventory,
            uploads_src: get("UPLOADS_SRC").unwrap_or_else(|| DEFAULT_UPLOADS_SRC.into()).into(),
            uploads_dst: get("UPLOADS_DST").unwrap_or_else(|| DEFAULT_UPLOADS_DST.into()).into(),
            target_s3_bucket: get("TARGET_S3_BUCKET"),
        })
    }

    pub fn needs_secrets(&self) -> bool {
        self.catalog.is_secret() || self.inventory.is_secret()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub products_read: usize,
    pub products_inserted: u64,
    pub inventory_read: usize,
    pub inventory_inserted: u64,
    pub images_copied: usize,
}

/// Create the target schemas if needed.
pub async fn prepare_targets(catalog: &DatabaseConnection, inventory: &DatabaseConnection) -> Result<(), ServiceError> {
    CatalogMigrator::up(catalog, None).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    InventoryMigrator::up(inventory, None).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!("target tables verified");
    Ok(())
}

/// Move the sequence behind `table.id` past the highest copied id.
async fn reset_sequence<C: ConnectionTrait>(db: &C, table: &str) -> Result<(), ServiceError> {
    let sql = format!(
        "SELECT setval('{table}_id_seq', (SELECT COALESCE(MAX(id), 0) + 1 FROM {table}), false)"
    );
    db.execute_unprepared(&sql).await?;
    Ok(())
}

/// Insert `rows` with their ids in chunks; ids already present are skipped.
/// Returns how many rows were written.
pub async fn insert_products<C: ConnectionTrait>(db: &C, rows: &[product::Model]) -> Result<u64, ServiceError> {
    let mut inserted = 0;
    for chunk in rows.chunks(INSERT_CHUNK) {
        let models = chunk.iter().cloned().map(|m| product::ActiveModel {
            id: Set(m.id),
            name: Set(m.name),
            description: Set(m.description),
            price: Set(m.price),
            image_path: Set(m.image_path),
            created_at: Set(m.created_at),
        });
        inserted += product::Entity::insert_many(models)
            .on_conflict(OnConflict::column(product::Column::Id).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }
    Ok(inserted)
}

pub async fn insert_inventory<C: ConnectionTrait>(db: &C, rows: &[inventory::Model]) -> Result<u64, ServiceError> {
    let mut inserted = 0;
    for chunk in rows.chunks(INSERT_CHUNK) {
        let models = chunk.iter().cloned().map(|m| inventory::ActiveModel {
            id: Set(m.id),
            product_id: Set(m.product_id),
            quantity: Set(m.quantity),
            warehouse: Set(m.warehouse),
            updated_at: Set(m.updated_at),
        });
        inserted += inventory::Entity::insert_many(models)
            .on_conflict(OnConflict::column(inventory::Column::Id).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }
    Ok(inserted)
}

/// Copy products keeping their ids, in one transaction on `dst`.
pub async fn copy_products(src: &DatabaseConnection, dst: &DatabaseConnection) -> Result<(usize, u64), ServiceError> {
    let rows = product::Entity::find().all(src).await?;
    if rows.is_empty() {
        info!("no products to migrate");
        return Ok((0, 0));
    }
    let txn = dst.begin().await?;
    let inserted = insert_products(&txn, &rows).await?;
    reset_sequence(&txn, "products").await?;
    txn.commit().await?;
    info!(read = rows.len(), inserted, "migrated products");
    Ok((rows.len(), inserted))
}

pub async fn copy_inventory(src: &DatabaseConnection, dst: &DatabaseConnection) -> Result<(usize, u64), ServiceError> {
    let rows = inventory::Entity::find().all(src).await?;
    if rows.is_empty() {
        info!("no inventory to migrate");
        return Ok((0, 0));
    }
    let txn = dst.begin().await?;
    let inserted = insert_inventory(&txn, &rows).await?;
    reset_sequence(&txn, "inventory").await?;
    txn.commit().await?;
    info!(read = rows.len(), inserted, "migrated inventory records");
    Ok((rows.len(), inserted))
}

/// Regular files directly under `dir`, sorted by name.
async fn list_files(dir: &Path) -> Result<Vec<String>, ServiceError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| ServiceError::Storage(e.to_string()))? {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Copy every uploaded image from `src` to `dst`, in name order.
pub async fn copy_images(src: &Path, dst: &Path) -> Result<usize, ServiceError> {
    if fs::metadata(src).await.is_err() {
        warn!(path = %src.display(), "uploads directory not found; no images to copy");
        return Ok(0);
    }
    fs::create_dir_all(dst).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    let files = list_files(src).await?;
    if files.is_empty() {
        info!("no images to copy");
        return Ok(0);
    }
    for name in &files {
        fs::copy(src.join(name), dst.join(name))
            .await
            .map_err(|e| ServiceError::Storage(format!("{name}: {e}")))?;
        info!(file = %name, "copied image");
    }
    info!(count = files.len(), dst = %dst.display(), "images copied");
    Ok(files.len())
}

/// Upload every image in `src` as `uploads/<name>`, in name order.
pub async fn upload_images(src: &Path, target: &S3Storage) -> Result<usize, ServiceError> {
    if fs::metadata(src).await.is_err() {
        warn!(path = %src.display(), "uploads directory not found; no images to upload");
        return Ok(0);
    }
    let files = list_files(src).await?;
    if files.is_empty() {
        info!("no images to upload");
        return Ok(0);
    }
    for name in &files {
        let key = object_key(name);
        let body = ByteStream::from_path(src.join(name))
            .await
            .map_err(|e| ServiceError::Storage(format!("{name}: {e}")))?;
        target
            .client()
            .put_object()
            .bucket(target.bucket())
            .key(&key)
            .content_type(guess_content_type(name))
            .body(body)
            .send()
            .await
            .map_err(storage_error)?;
        info!(file = %name, bucket = %target.bucket(), %key, "uploaded image");
    }
    info!(count = files.len(), bucket = %target.bucket(), "images uploaded to S3");
    Ok(files.len())
}

/// Full run: schema, products, inventory, then images.
pub async fn migrate(
    cfg: &DataMigrationConfig,
    monolith: &DatabaseConnection,
    catalog: &DatabaseConnection,
    inventory: &DatabaseConnection,
) -> Result<MigrationReport, ServiceError> {
    prepare_targets(catalog, inventory).await?;
    let (products_read, products_inserted) = copy_products(monolith, catalog).await?;
    let (inventory_read, inventory_inserted) = copy_inventory(monolith, inventory).await?;
    let images_copied = match &cfg.target_s3_bucket {
        Some(bucket) => upload_images(&cfg.uploads_src, &S3Storage::from_env(bucket.clone()).await).await?,
        None => {
            info!("TARGET_S3_BUCKET not set; copying images locally");
            copy_images(&cfg.uploads_src, &cfg.uploads_dst).await?
        }
    };
    Ok(MigrationReport { products_read, products_inserted, inventory_read, inventory_inserted, images_copied })
}
