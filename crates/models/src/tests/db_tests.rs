use crate::db::{connect_with_config, ping};
use configs::DatabaseConfig;
use sea_orm::{DatabaseBackend, Statement, ConnectionTrait};
use std::time::{Duration, Instant};
use anyhow::Result;

use super::test_db;

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);

    ping(&db).await?;
    Ok(())
}

/// Test connection with custom pool configuration
#[tokio::test]
async fn test_custom_config_connection() -> Result<()> {
    if test_db().await.is_none() {
        return Ok(());
    }
    let mut cfg = DatabaseConfig::for_url(std::env::var("DATABASE_URL")?);
    cfg.max_connections = 3;
    cfg.min_connections = 1;
    cfg.connect_timeout_secs = 5;

    let start = Instant::now();
    let db = connect_with_config(&cfg).await?;
    ping(&db).await?;
    assert!(start.elapsed() < Duration::from_secs(5), "connection took too long");
    Ok(())
}
