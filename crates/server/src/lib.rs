//! HTTP surfaces: catalog and inventory APIs, the storefront frontend, and
//! the process roles that combine them.

pub mod errors;
pub mod routes;
pub mod startup;

pub use startup::{run, Role};
