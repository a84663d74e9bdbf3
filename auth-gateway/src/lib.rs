//! Authorization gate for the users API
//!
//! This crate puts the decisions of [`auth_fga`] into the request pipeline:
//! - Caller identity extraction from `X-User-ID` or `Authorization`
//! - Per-route permission enforcement as axum middleware
//! - Uniform JSON error bodies for 401, 403 and 500 responses
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use auth_fga::{AuthorizationService, FgaClientHandle, Permission};
//! use auth_gateway::{enforce_permission, PermissionGate};
//! use axum::{handler::Handler, middleware, routing::get, Router};
//!
//! let authz = AuthorizationService::new(Arc::new(FgaClientHandle::unavailable()));
//! let gate = PermissionGate::new(authz, Permission::CanRead);
//!
//! let app: Router = Router::new().route(
//!     "/api/users/:id",
//!     get(get_user.layer(middleware::from_fn_with_state(gate, enforce_permission))),
//! );
//!
//! async fn get_user() -> &'static str {
//!     "user"
//! }
//! ```

pub mod actor;
pub mod error;
pub mod gate;

pub use actor::{Actor, USER_ID_HEADER};
pub use error::{ErrorBody, GateError};
pub use gate::{enforce_permission, PermissionGate};
