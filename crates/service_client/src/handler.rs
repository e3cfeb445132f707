use async_trait::async_trait;
use serde_json::Value;

use crate::{errors::LocalError, request::Invocation};

/// In-process implementation of a logical service.
///
/// Implementations route on `(invocation.method, invocation.segments())` and
/// must return the same JSON the service's HTTP route would send, so callers
/// see one response shape whichever way the call was dispatched.
#[async_trait]
pub trait LocalHandler: Send + Sync {
    async fn handle(&self, invocation: &Invocation) -> Result<Value, LocalError>;
}
