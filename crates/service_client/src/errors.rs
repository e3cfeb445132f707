use std::convert::Infallible;

use thiserror::Error;

/// Error type produced by in-process handlers; kept boxed so callers can
/// downcast back to the handler's own error.
pub type LocalError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Unknown service identifier, unusable address or a service with no binding.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Remote service answered with a non-2xx status.
    #[error("remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("cannot decode response: {0}")]
    Decode(String),
    /// Error raised by the local handler, untouched.
    #[error("{0}")]
    Local(#[source] LocalError),
}

impl ClientError {
    pub fn configuration(msg: impl Into<String>) -> Self { Self::Configuration(msg.into()) }

    /// HTTP status of a failed remote call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteCall { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The local handler's original error, if it is an `E`.
    pub fn downcast_local<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Local(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<Infallible> for ClientError {
    fn from(never: Infallible) -> Self { match never {} }
}
