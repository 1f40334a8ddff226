//! B-Ticket client core
//!
//! Session persistence, the authenticated API client, ticket status
//! resolution, typed data access and the ticket purchase flow. UI shells
//! drive it through `AppState` and receive navigation requests through a
//! `Navigator`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use client::navigation::LogNavigator;
//! use client::state::AppState;
//! use common::config::ClientConfig;
//! use common::storage::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let store = Arc::new(FileStore::new(&config.storage_path));
//!     let app = AppState::init(config, store, Arc::new(LogNavigator)).await;
//!
//!     let session = app.auth.login("jane@example.com", "secret123").await?;
//!     println!("Signed in: {}", session.is_authenticated());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod payment;
pub mod repositories;
pub mod search;
pub mod session;
pub mod state;
pub mod ticket_status;
pub mod validation;

pub use error::{ClientError, ClientResult};
