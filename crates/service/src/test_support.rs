#![cfg(test)]
use std::sync::Arc;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::storage::LocalStorage;

// Migrations run once per test process.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// A migrated connection, or `None` when database tests are disabled.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    MIGRATED
        .get_or_try_init(|| async {
            let db = models::db::connect().await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    Ok(Some(models::db::connect().await?))
}

pub fn tmp_storage() -> Arc<LocalStorage> {
    Arc::new(LocalStorage::new(std::env::temp_dir().join(format!("ecomm_svc_{}", Uuid::new_v4()))))
}

/// `url` pointing at database `name` instead, query string kept.
pub fn with_database(url: &str, name: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((b, q)) => (b, Some(q)),
        None => (url, None),
    };
    let authority_start = base.find("://").map(|i| i + 3).unwrap_or(0);
    let root = match base[authority_start..].find('/') {
        Some(slash) => &base[..authority_start + slash],
        None => base,
    };
    match query {
        Some(q) => format!("{root}/{name}?{q}"),
        None => format!("{root}/{name}"),
    }
}

/// An empty database created next to the test database, for tests that
/// need a whole database to themselves.
pub struct ScratchDb {
    pub conn: DatabaseConnection,
    name: String,
}

impl ScratchDb {
    /// `None` when the server refuses `CREATE DATABASE`.
    pub async fn create(admin: &DatabaseConnection, label: &str) -> Result<Option<Self>, anyhow::Error> {
        let name = format!("ecomm_{label}_{}", Uuid::new_v4().simple());
        if let Err(e) = admin.execute_unprepared(&format!("CREATE DATABASE {name}")).await {
            eprintln!("skipping: cannot create scratch database {name}: {e}");
            return Ok(None);
        }
        let url = with_database(models::db::DATABASE_URL.as_str(), &name);
        let conn = models::db::connect_with_config(&DatabaseConfig::for_url(url)).await?;
        Ok(Some(Self { conn, name }))
    }

    pub async fn destroy(self, admin: &DatabaseConnection) -> Result<(), anyhow::Error> {
        self.conn.close().await?;
        admin.execute_unprepared(&format!("DROP DATABASE IF EXISTS {}", self.name)).await?;
        Ok(())
    }
}

#[test]
fn database_name_is_swapped() {
    assert_eq!(with_database("postgres://u:p@db:5432/ecomm", "x"), "postgres://u:p@db:5432/x");
    assert_eq!(with_database("postgres://u@db/ecomm?sslmode=disable", "x"), "postgres://u@db/x?sslmode=disable");
    assert_eq!(with_database("postgres://u@db:5432", "x"), "postgres://u@db:5432/x");
}
