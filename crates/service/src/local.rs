//! In-process handlers that let a [`service_client::ServiceClient`] reach
//! the catalog and inventory operations without HTTP.
//!
//! Routes mirror the HTTP API (minus the `/api` prefix) and return the same
//! JSON views, so callers cannot tell which mode served them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use service_client::{Invocation, LocalError, LocalHandler, Method, Payload};

use crate::catalog::{CatalogService, NewProduct, ProductPatch};
use crate::errors::ServiceError;
use crate::inventory::{InventoryPatch, InventoryService};

fn to_json<T: Serialize>(v: T) -> Result<Value, ServiceError> {
    Ok(serde_json::to_value(v)?)
}

fn no_route(inv: &Invocation) -> ServiceError {
    ServiceError::NotFound(format!("no route for {} {}", inv.method, inv.path))
}

/// Integer path id; anything else is treated like an unmatched route.
fn parse_id(raw: &str, inv: &Invocation) -> Result<i32, ServiceError> {
    raw.parse::<i32>().map_err(|_| no_route(inv))
}

fn json_body<T: DeserializeOwned>(inv: &Invocation) -> Result<T, ServiceError> {
    match &inv.body {
        Payload::Json(v) => {
            serde_json::from_value(v.clone()).map_err(|e| ServiceError::Validation(format!("invalid JSON body: {e}")))
        }
        Payload::Empty | Payload::Form(_) => Err(ServiceError::Validation("expected a JSON body".into())),
    }
}

pub struct CatalogHandler {
    service: CatalogService,
}

impl CatalogHandler {
    pub fn new(service: CatalogService) -> Self {
        Self { service }
    }

    async fn route(&self, inv: &Invocation) -> Result<Value, ServiceError> {
        let segments = inv.segments();
        match (inv.method, segments.as_slice()) {
            (Method::Get, ["products"]) => to_json(self.service.list_products().await?),
            (Method::Post, ["products"]) => {
                let input = match &inv.body {
                    Payload::Form(form) => NewProduct::from_form(form)?,
                    _ => return Err(ServiceError::Validation("name and price are required".into())),
                };
                to_json(self.service.create_product(input).await?)
            }
            (Method::Get, ["products", id]) => to_json(self.service.get_product(parse_id(id, inv)?).await?),
            (Method::Put, ["products", id]) => {
                let id = parse_id(id, inv)?;
                let patch: ProductPatch = json_body(inv)?;
                to_json(self.service.update_product(id, patch).await?)
            }
            (Method::Delete, ["products", id]) => to_json(self.service.delete_product(parse_id(id, inv)?).await?),
            _ => Err(no_route(inv)),
        }
    }
}

#[async_trait]
impl LocalHandler for CatalogHandler {
    async fn handle(&self, invocation: &Invocation) -> Result<Value, LocalError> {
        self.route(invocation).await.map_err(|e| Box::new(e) as LocalError)
    }
}

pub struct InventoryHandler {
    service: InventoryService,
}

impl InventoryHandler {
    pub fn new(service: InventoryService) -> Self {
        Self { service }
    }

    async fn route(&self, inv: &Invocation) -> Result<Value, ServiceError> {
        let segments = inv.segments();
        match (inv.method, segments.as_slice()) {
            (Method::Get, ["inventory"]) => to_json(self.service.list_inventory().await?),
            (Method::Get, ["inventory", pid]) => to_json(self.service.get_inventory(parse_id(pid, inv)?).await?),
            (Method::Put, ["inventory", pid]) => {
                let pid = parse_id(pid, inv)?;
                let patch: InventoryPatch = json_body(inv)?;
                to_json(self.service.upsert_inventory(pid, patch).await?)
            }
            _ => Err(no_route(inv)),
        }
    }
}

#[async_trait]
impl LocalHandler for InventoryHandler {
    async fn handle(&self, invocation: &Invocation) -> Result<Value, LocalError> {
        self.route(invocation).await.map_err(|e| Box::new(e) as LocalError)
    }
}
