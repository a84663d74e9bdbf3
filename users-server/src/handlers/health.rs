use axum::{extract::State, response::Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    /// Seconds since the server started
    pub uptime: f64,
    /// `openfga` when the relationship store answered at startup, `fallback` otherwise
    pub authorization: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let authorization = if state.connected {
        "openfga"
    } else {
        "fallback"
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.uptime_secs(),
        authorization: authorization.to_string(),
    })
}

/// Service description
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Users API with OpenFGA relationship-based authorization",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "users": {
                "getAll": "GET /api/users",
                "getById": "GET /api/users/:id",
                "create": "POST /api/users",
                "update": "PUT /api/users/:id",
                "delete": "DELETE /api/users/:id",
            },
        },
        "authorization": {
            "note": "Use the X-User-ID header to specify the requesting user",
            "examples": {
                "admin": "X-User-ID: admin",
                "user1": "X-User-ID: 1",
                "user2": "X-User-ID: 2",
            },
        },
    }))
}
