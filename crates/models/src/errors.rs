use thiserror::Error;

/// Failures of the product and inventory data layer.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Lookup by primary key or product id found no row.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn not_found(entity: &'static str, id: i32) -> Self { Self::NotFound { entity, id } }
}
