//! Uniform invocation of the storefront's logical services.
//!
//! A [`ServiceClient`] binds every [`LogicalService`] at construction time to
//! either an in-process [`LocalHandler`] (no address configured) or a remote
//! base URL. Callers issue `get`/`post`/`put`/`delete` the same way in both
//! cases and always receive a decoded JSON value.
//!
//! ```ignore
//! let endpoints = ServiceEndpoints::new().with(LogicalService::Catalog, "http://catalog:8001");
//! let client = ServiceClient::builder(endpoints)
//!     .local(LogicalService::Inventory, inventory_handler)
//!     .build()?;
//! let product = client.get("catalog", "/products/1").await?; // GET http://catalog:8001/api/products/1
//! let stock = client.get(LogicalService::Inventory, "/inventory/1").await?; // in-process
//! ```

pub mod errors;
pub mod service;
pub mod request;
pub mod handler;
pub mod client;
mod metrics;

pub use client::{Mode, ServiceClient, ServiceClientBuilder};
pub use errors::{ClientError, LocalError};
pub use handler::LocalHandler;
pub use request::{FilePart, FormBody, Invocation, Method, Payload};
pub use service::{LogicalService, ServiceEndpoints};
