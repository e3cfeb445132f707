use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use service::errors::ServiceError;
use service_client::ClientError;
use thiserror::Error;
use tracing::{error, warn};

/// Error response with a `{"error": message}` body.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.message, "request failed");
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Db(_) | ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.public_message())
    }
}

/// `{"error": ...}` from a remote body when present, else the raw body.
fn remote_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

impl From<ClientError> for JsonApiError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::RemoteCall { status, body } if (400..500).contains(&status) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
                Self::new(status, remote_message(&body))
            }
            ClientError::RemoteCall { status, body } => {
                warn!(status, "upstream service error");
                Self::new(StatusCode::BAD_GATEWAY, format!("upstream returned {status}: {}", remote_message(&body)))
            }
            ClientError::Transport(e) => Self::new(StatusCode::BAD_GATEWAY, format!("upstream unreachable: {e}")),
            ClientError::Decode(m) => Self::new(StatusCode::BAD_GATEWAY, format!("bad upstream response: {m}")),
            ClientError::Configuration(m) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, m),
            ClientError::Local(inner) => match inner.downcast::<ServiceError>() {
                Ok(svc) => (*svc).into(),
                Err(other) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
