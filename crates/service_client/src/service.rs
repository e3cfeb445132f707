use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use configs::ServicesConfig;

use crate::errors::ClientError;

/// Logical services a storefront process can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalService {
    Catalog,
    Inventory,
}

impl LogicalService {
    pub const ALL: [LogicalService; 2] = [LogicalService::Catalog, LogicalService::Inventory];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalService::Catalog => "catalog",
            LogicalService::Inventory => "inventory",
        }
    }

    /// Environment variable holding this service's address.
    pub fn url_env_var(self) -> &'static str {
        match self {
            LogicalService::Catalog => "CATALOG_SERVICE_URL",
            LogicalService::Inventory => "INVENTORY_SERVICE_URL",
        }
    }
}

impl fmt::Display for LogicalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalService {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(LogicalService::Catalog),
            "inventory" => Ok(LogicalService::Inventory),
            other => Err(ClientError::configuration(format!("unknown service: {other:?}"))),
        }
    }
}

impl TryFrom<&str> for LogicalService {
    type Error = ClientError;

    fn try_from(s: &str) -> Result<Self, Self::Error> { s.parse() }
}

impl TryFrom<&String> for LogicalService {
    type Error = ClientError;

    fn try_from(s: &String) -> Result<Self, Self::Error> { s.parse() }
}

/// Address per logical service. A service without an address is served
/// in-process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceEndpoints {
    addresses: BTreeMap<LogicalService, String>,
}

impl ServiceEndpoints {
    pub fn new() -> Self { Self::default() }

    /// Set an address; blank addresses leave the service local.
    pub fn with(mut self, service: LogicalService, address: impl Into<String>) -> Self {
        self.set(service, Some(address.into()));
        self
    }

    pub fn set(&mut self, service: LogicalService, address: Option<String>) {
        match address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
            Some(a) => { self.addresses.insert(service, a); }
            None => { self.addresses.remove(&service); }
        }
    }

    pub fn address(&self, service: LogicalService) -> Option<&str> {
        self.addresses.get(&service).map(String::as_str)
    }

    pub fn is_remote(&self, service: LogicalService) -> bool {
        self.addresses.contains_key(&service)
    }
}

impl From<&ServicesConfig> for ServiceEndpoints {
    fn from(cfg: &ServicesConfig) -> Self {
        let mut endpoints = ServiceEndpoints::new();
        endpoints.set(LogicalService::Catalog, cfg.catalog_url.clone());
        endpoints.set(LogicalService::Inventory, cfg.inventory_url.clone());
        endpoints
    }
}
