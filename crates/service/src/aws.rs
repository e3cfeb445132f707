//! AWS plumbing: SDK config, database URLs from Secrets Manager.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use configs::{DatabaseConfig, SecretRef};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::ServiceError;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DB_PORT: u16 = 5432;

/// `AWS_REGION`, then `AWS_DEFAULT_REGION`, then `us-east-1`.
pub fn region_from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> String {
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Shared SDK config; credentials come from the usual provider chain.
pub async fn sdk_config() -> SdkConfig {
    let region = region_from_lookup(|k| std::env::var(k).ok());
    aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region)).load().await
}

/// Connection details stored in a database secret.
#[derive(Debug, Clone, Deserialize)]
pub struct DbSecret {
    pub host: String,
    #[serde(default)]
    port: Option<Value>,
    pub username: String,
    pub password: String,
}

impl DbSecret {
    pub fn parse(secret_string: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(secret_string)
            .map_err(|e| ServiceError::Validation(format!("database secret is not valid: {e}")))
    }

    /// Port as stored; RDS writes a number, hand-made secrets often a string.
    pub fn port(&self) -> String {
        match &self.port {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => DEFAULT_DB_PORT.to_string(),
        }
    }

    pub fn database_url(&self, db_name: &str) -> String {
        format!("postgresql://{}:{}@{}:{}/{}", self.username, self.password, self.host, self.port(), db_name)
    }
}

/// Fetches database secrets.
#[derive(Clone, Debug)]
pub struct SecretResolver {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretResolver {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self { client: aws_sdk_secretsmanager::Client::new(sdk) }
    }

    pub async fn from_env() -> Self {
        Self::new(&sdk_config().await)
    }

    pub async fn database_url(&self, secret: &SecretRef) -> Result<String, ServiceError> {
        info!(secret = %secret.secret_name, db = %secret.db_name, "fetching database credentials from Secrets Manager");
        let resp = self
            .client
            .get_secret_value()
            .secret_id(&secret.secret_name)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("{}: {}", secret.secret_name, DisplayErrorContext(&e))))?;
        let raw = resp
            .secret_string()
            .ok_or_else(|| ServiceError::Validation(format!("{}: secret has no string value", secret.secret_name)))?;
        Ok(DbSecret::parse(raw)?.database_url(&secret.db_name))
    }
}

/// `cfg` with its URL filled in from Secrets Manager when it names a secret
/// instead of a URL; otherwise unchanged.
pub async fn resolve_database(cfg: &DatabaseConfig) -> Result<DatabaseConfig, ServiceError> {
    let Some(secret) = cfg.secret.as_ref().filter(|_| cfg.needs_secret()) else {
        return Ok(cfg.clone());
    };
    let url = SecretResolver::from_env().await.database_url(secret).await?;
    Ok(DatabaseConfig { url, secret: None, ..cfg.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn region_precedence() {
        assert_eq!(region_from_lookup(lookup(&[])), "us-east-1");
        assert_eq!(region_from_lookup(lookup(&[("AWS_DEFAULT_REGION", "eu-west-1")])), "eu-west-1");
        assert_eq!(
            region_from_lookup(lookup(&[("AWS_REGION", "ap-south-1"), ("AWS_DEFAULT_REGION", "eu-west-1")])),
            "ap-south-1"
        );
        assert_eq!(region_from_lookup(lookup(&[("AWS_REGION", " ")])), "us-east-1");
    }

    #[test]
    fn secret_builds_postgres_url() {
        let s = DbSecret::parse(r#"{"host":"db.internal","port":6543,"username":"cat","password":"pw","engine":"postgres"}"#)
            .unwrap();
        assert_eq!(s.database_url("dbcatalog01"), "postgresql://cat:pw@db.internal:6543/dbcatalog01");

        let s = DbSecret::parse(r#"{"host":"db","username":"u","password":"p"}"#).unwrap();
        assert_eq!(s.database_url("inv"), "postgresql://u:p@db:5432/inv");

        let s = DbSecret::parse(r#"{"host":"db","port":"5433","username":"u","password":"p"}"#).unwrap();
        assert_eq!(s.port(), "5433");
    }

    #[test]
    fn secret_without_credentials_is_rejected() {
        let err = DbSecret::parse(r#"{"host":"db"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn url_config_is_left_alone() {
        let cfg = DatabaseConfig::for_url("postgres://a@b/c");
        assert_eq!(resolve_database(&cfg).await.unwrap().url, "postgres://a@b/c");
    }
}
