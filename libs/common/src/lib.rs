//! Common library for the Photos API
//!
//! This crate provides shared functionality used across the services,
//! including the JSON document store, typed record collections,
//! pagination, roles and error types.

pub mod collection;
pub mod error;
pub mod pagination;
pub mod principal;
pub mod store;

/// Example usage of the document store
///
/// ```rust,no_run
/// use common::store::{JsonFileStore, StorageConfig, USERS_DOCUMENT, PHOTOS_DOCUMENT};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = StorageConfig::from_env();
///     let store = JsonFileStore::init(&config, &[USERS_DOCUMENT, PHOTOS_DOCUMENT]).await?;
///     let is_healthy = store.health_check().await?;
///     println!("Document store health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
