use axum::{
    handler::Handler,
    http::Uri,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};

use auth_fga::Permission;
use auth_gateway::{enforce_permission, PermissionGate};

use crate::{
    error::ApiError,
    handlers::{health, users},
    server::AppState,
};

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/", get(health::service_info))
}

/// Create users routes, each behind the question it needs answered
pub fn user_routes(state: &AppState) -> Router<AppState> {
    let gate = |permission| {
        from_fn_with_state(PermissionGate::new(state.authz.clone(), permission), enforce_permission)
    };

    Router::new()
        .route(
            "/users",
            get(users::list_users.layer(gate(Permission::CanReadAll)))
                .post(users::create_user.layer(gate(Permission::CanCreate))),
        )
        .route(
            "/users/:id",
            get(users::get_user.layer(gate(Permission::CanRead)))
                .put(users::update_user.layer(gate(Permission::CanWrite)))
                .delete(users::delete_user.layer(gate(Permission::CanDelete))),
        )
}

/// Unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        path: uri.path().to_string(),
    }
}

pub fn create_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api", user_routes(state))
        .fallback(not_found)
}
