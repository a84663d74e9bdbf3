//! Users API server
//!
//! This library provides the HTTP surface of the users service: CRUD routes
//! over user records, each gated by a relationship-based permission check,
//! with tuple upkeep when records are created or deleted.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use error::*;
pub use server::AppState;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    routes::create_routes(&state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(state)
}
