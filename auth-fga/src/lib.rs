//! Relationship-based authorization for the users API
//!
//! This crate answers the permission questions the users API asks before it
//! touches a record, backed by an OpenFGA store:
//! - Per-record questions: read, write and delete a single user
//! - Collection questions: list all users and create users
//! - Tuple maintenance when records are created or deleted
//! - Baseline seeding and a connectivity probe at startup
//!
//! # Core Concepts
//!
//! - **Subject**: the principal asking, always `user:<id>`
//! - **Object**: a user record (`user:<id>`) or the collection (`users_collection:all`)
//! - **Relation**: `owner`, `can_read`, `can_write`, `can_delete`, `can_read_all`, `can_create`
//! - **Tuple**: a relationship statement: "subject has relation to object"
//!
//! When no store is configured, or a check cannot be completed, decisions come
//! from a local rule: a user may act on their own record, the admin may act on
//! everything. A successful remote answer always wins over that rule.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use auth_fga::{
//!     AuthorizationService, FgaClientHandle, InMemoryTupleStore, TupleLifecycleManager,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = Arc::new(FgaClientHandle::with_client(Arc::new(InMemoryTupleStore::new())));
//! let lifecycle = TupleLifecycleManager::new(handle.clone());
//! let authz = AuthorizationService::new(handle);
//!
//! lifecycle.on_resource_created("42", "admin").await;
//!
//! assert!(authz.can_read_user("42", "42").await?);
//! assert!(authz.can_delete_user("42", "admin").await?);
//! assert!(!authz.can_write_user("42", "7").await?);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod models;
pub mod openfga;
pub mod repository;

pub use client::{BatchSummary, TupleOutcome, TupleStoreClient};
pub use config::FgaConfig;
pub use engine::{fallback_allows, AuthorizationService};
pub use error::{FgaError, Result};
pub use handle::{FgaClientHandle, SharedClient};
pub use lifecycle::TupleLifecycleManager;
pub use models::*;
pub use openfga::OpenFgaClient;
pub use repository::InMemoryTupleStore;
