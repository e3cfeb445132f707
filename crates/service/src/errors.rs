use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Message without the variant prefix, as shown to API clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(m) | Self::NotFound(m) => m.clone(),
            Self::Db(_) | Self::Storage(_) | Self::Internal(_) => self.to_string(),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => Self::Validation(m),
            ModelError::NotFound { entity, .. } => Self::not_found(entity),
            ModelError::Db(m) => Self::Db(m),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self { Self::Internal(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_keep_their_category() {
        let e: ServiceError = ModelError::Validation("price must be a non-negative number".into()).into();
        assert!(matches!(e, ServiceError::Validation(_)));
        assert_eq!(e.public_message(), "price must be a non-negative number");
        let e: ServiceError = ModelError::Db("connection reset".into()).into();
        assert!(matches!(e, ServiceError::Db(_)));
    }

    #[test]
    fn missing_rows_become_not_found() {
        let e: ServiceError = ModelError::not_found("Product", 7).into();
        assert!(matches!(e, ServiceError::NotFound(_)));
        assert_eq!(e.public_message(), "Product not found");
    }

    #[test]
    fn not_found_message() {
        assert_eq!(ServiceError::not_found("Product").public_message(), "Product not found");
    }
}
