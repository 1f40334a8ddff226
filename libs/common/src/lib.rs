//! Common library for the B-Ticket client
//!
//! This crate provides the pieces shared by the client services: durable
//! key-value storage for the session, configuration loading and the
//! matching error types.

pub mod config;
pub mod error;
pub mod storage;

/// Example usage of the storage module
///
/// ```rust,no_run
/// use common::config::ClientConfig;
/// use common::storage::{FileStore, KeyValueStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let store = FileStore::new(&config.storage_path);
///     let is_healthy = store.health_check().await?;
///     println!("Storage health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
