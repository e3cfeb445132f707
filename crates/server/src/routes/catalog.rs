//! `/api/products`: the catalog service's HTTP surface.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::types::Message;
use service::catalog::{CatalogService, NewProduct, ProductPatch};
use service::errors::ServiceError;
use service::views::ProductView;
use tracing::info;

use super::forms::read_multipart;
use crate::errors::JsonApiError;

pub fn router(svc: CatalogService) -> Router {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/:id", get(show).put(update).delete(remove))
        .with_state(svc)
}

/// Only integer ids route; anything else is a missing product.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<i32, JsonApiError> {
    raw.parse::<i32>().map_err(|_| ServiceError::not_found(entity).into())
}

pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, JsonApiError> {
    body.map(|Json(v)| v).map_err(|e| JsonApiError::bad_request(e.body_text()))
}

async fn list(State(svc): State<CatalogService>) -> Result<Json<Vec<ProductView>>, JsonApiError> {
    Ok(Json(svc.list_products().await?))
}

async fn show(State(svc): State<CatalogService>, Path(id): Path<String>) -> Result<Json<ProductView>, JsonApiError> {
    let id = parse_id(&id, "Product")?;
    Ok(Json(svc.get_product(id).await?))
}

async fn create(
    State(svc): State<CatalogService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProductView>), JsonApiError> {
    let multipart = multipart.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let form = read_multipart(multipart).await?;
    let input = NewProduct::from_form(&form)?;
    let created = svc.create_product(input).await?;
    info!(id = created.id, "product created via api");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(svc): State<CatalogService>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<ProductView>, JsonApiError> {
    let id = parse_id(&id, "Product")?;
    let patch = json_body(body)?;
    Ok(Json(svc.update_product(id, patch).await?))
}

async fn remove(State(svc): State<CatalogService>, Path(id): Path<String>) -> Result<Json<Message>, JsonApiError> {
    let id = parse_id(&id, "Product")?;
    Ok(Json(svc.delete_product(id).await?))
}
