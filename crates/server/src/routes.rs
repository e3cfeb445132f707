//! Routers for each process role, composed by `startup`.

pub mod catalog;
pub mod forms;
pub mod frontend;
pub mod inventory;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use common::types::Health;
use sea_orm::DatabaseConnection;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::errors::JsonApiError;

/// Liveness for processes without a database.
pub async fn health() -> Json<Health> {
    Json(Health::healthy())
}

/// Liveness plus a `SELECT 1` round trip.
pub async fn health_with_db(State(db): State<DatabaseConnection>) -> Result<Json<Health>, JsonApiError> {
    models::db::ping(&db)
        .await
        .map_err(|e| JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, format!("database unavailable: {e}")))?;
    Ok(Json(Health::healthy()))
}

/// `/health` (DB-checked when `db` is given) and `/metrics`.
pub fn ops_router(db: Option<DatabaseConnection>) -> Router {
    let metrics = Router::new().route("/metrics", get(common::metrics::metrics_handler));
    match db {
        Some(db) => {
            let health: Router = Router::new().route("/health", get(health_with_db)).with_state(db);
            metrics.merge(health)
        }
        None => metrics.route("/health", get(health)),
    }
}

/// Uploaded images under `/static`.
pub fn static_router(static_dir: &str) -> Router {
    Router::new().nest_service("/static", ServeDir::new(static_dir))
}

/// Request spans at INFO; failures (5xx) logged at ERROR.
pub fn with_tracing(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
