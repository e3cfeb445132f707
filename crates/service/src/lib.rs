//! Business operations for the storefront's two services.
//! - `catalog` and `inventory` hold the operations, on top of `models`.
//! - `local` exposes them to `service_client` for in-process dispatch.
//! - `seed` and `data_migration` back the maintenance binaries.
//! - `aws` resolves database secrets and builds SDK clients for S3 storage.

pub mod errors;
pub mod aws;
pub mod views;
pub mod storage;
pub mod catalog;
pub mod inventory;
pub mod local;
pub mod seed;
pub mod data_migration;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
mod db_tests;
