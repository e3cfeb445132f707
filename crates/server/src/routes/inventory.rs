//! `/api/inventory`: the inventory service's HTTP surface.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use service::inventory::{InventoryPatch, InventoryService};
use service::views::InventoryView;

use super::catalog::{json_body, parse_id};
use crate::errors::JsonApiError;

pub fn router(svc: InventoryService) -> Router {
    Router::new()
        .route("/api/inventory", get(list))
        .route("/api/inventory/:product_id", get(show).put(upsert))
        .with_state(svc)
}

async fn list(State(svc): State<InventoryService>) -> Result<Json<Vec<InventoryView>>, JsonApiError> {
    Ok(Json(svc.list_inventory().await?))
}

async fn show(State(svc): State<InventoryService>, Path(pid): Path<String>) -> Result<Json<InventoryView>, JsonApiError> {
    let pid = parse_id(&pid, "Inventory")?;
    Ok(Json(svc.get_inventory(pid).await?))
}

async fn upsert(
    State(svc): State<InventoryService>,
    Path(pid): Path<String>,
    body: Result<Json<InventoryPatch>, JsonRejection>,
) -> Result<Json<InventoryView>, JsonApiError> {
    let pid = parse_id(&pid, "Inventory")?;
    let patch = json_body(body)?;
    Ok(Json(svc.upsert_inventory(pid, patch).await?))
}
