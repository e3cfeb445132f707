//! Storefront and admin endpoints. Every data access goes through the
//! [`ServiceClient`], so the same router works in-process or against remote
//! services.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::FormRejection,
        Form, Multipart, Path, State,
    },
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use service_client::{FormBody, LogicalService, ServiceClient};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use super::catalog::parse_id;
use super::forms::read_multipart;
use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct FrontendState {
    pub client: ServiceClient,
}

/// JSON view models under `/storefront`, the two form posts, and the static
/// pages in `frontend_dir` (unknown paths fall back to `index.html`).
pub fn router(client: ServiceClient, frontend_dir: &str) -> Router {
    let index = format!("{}/index.html", frontend_dir.trim_end_matches('/'));
    let pages = ServeDir::new(frontend_dir).fallback(ServeFile::new(index));
    api_router(client).fallback_service(pages)
}

/// Same routes without the static pages.
pub fn api_router(client: ServiceClient) -> Router {
    Router::new()
        .route("/storefront/products", get(products))
        .route("/storefront/products/:id", get(product_detail))
        .route("/admin/add-product", post(add_product))
        .route("/products/:id/inventory", post(update_inventory))
        .with_state(FrontendState { client })
}

async fn products(State(st): State<FrontendState>) -> Result<Json<Value>, JsonApiError> {
    Ok(Json(st.client.get(LogicalService::Catalog, "/products").await?))
}

async fn product_detail(State(st): State<FrontendState>, Path(id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id(&id, "Product")?;
    let product = st.client.get(LogicalService::Catalog, &format!("/products/{id}")).await?;
    let inventory = st.client.get(LogicalService::Inventory, &format!("/inventory/{id}")).await?;
    Ok(Json(json!({ "product": product, "inventory": inventory })))
}

/// Forward the admin form to the catalog. Only the known fields travel, and
/// an image part is dropped when no file was chosen.
fn catalog_form(submitted: &FormBody) -> FormBody {
    let mut form = FormBody::new();
    if let Some(name) = submitted.get("name") {
        form = form.field("name", name);
    }
    form = form.field("description", submitted.get("description").unwrap_or_default());
    if let Some(price) = submitted.get("price") {
        form = form.field("price", price);
    }
    if let Some(image) = submitted.get_file("image").filter(|f| !f.filename.is_empty()) {
        form = form.file(image.clone());
    }
    form
}

async fn add_product(
    State(st): State<FrontendState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, JsonApiError> {
    let multipart = multipart.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let submitted = read_multipart(multipart).await?;
    let created = st.client.post_form(LogicalService::Catalog, "/products", catalog_form(&submitted)).await?;
    info!(id = %created["id"], "product added from admin form");
    Ok(Redirect::to("/admin"))
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryForm {
    pub quantity: Option<String>,
    pub warehouse: Option<String>,
}

impl InventoryForm {
    /// JSON for the inventory service: quantity defaults to 0 and warehouse
    /// to `main`.
    fn to_json(&self) -> Result<Value, JsonApiError> {
        let quantity = match self.quantity.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => q
                .parse::<i32>()
                .map_err(|_| JsonApiError::bad_request(format!("quantity must be an integer, got {q:?}")))?,
            None => 0,
        };
        let warehouse = self
            .warehouse
            .as_deref()
            .unwrap_or(models::inventory::DEFAULT_WAREHOUSE);
        Ok(json!({ "quantity": quantity, "warehouse": warehouse }))
    }
}

async fn update_inventory(
    State(st): State<FrontendState>,
    Path(id): Path<String>,
    form: Result<Form<InventoryForm>, FormRejection>,
) -> Result<Redirect, JsonApiError> {
    let id = parse_id(&id, "Product")?;
    let Form(form) = form.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    st.client.put(LogicalService::Inventory, &format!("/inventory/{id}"), form.to_json()?).await?;
    Ok(Redirect::to(&format!("/products/{id}")))
}
