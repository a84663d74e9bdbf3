use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use auth_fga::{FgaError, Permission};

/// JSON body of every error response the users API produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    /// Short error kind, e.g. `Forbidden`
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unique error ID for tracking
    pub error_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message,
            error_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Pair the body with `status`
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Rejections produced by the authorization gate
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Missing caller identity")]
    Unauthenticated,

    #[error("You do not have permission to {}", .permission.action())]
    Forbidden { permission: Permission },

    #[error("Authorization check failed: {0}")]
    Internal(#[from] FgaError),
}

impl GateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GateError::Forbidden { .. } => StatusCode::FORBIDDEN,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the caller. Internal details stay in the logs.
    pub fn body(&self) -> ErrorBody {
        match self {
            GateError::Unauthenticated => ErrorBody::new("Unauthenticated", None),
            GateError::Forbidden { .. } => ErrorBody::new("Forbidden", Some(self.to_string())),
            GateError::Internal(_) => ErrorBody::new(
                "Internal Server Error",
                Some("Authorization check failed".to_string()),
            ),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = self.body();
        let status = self.status_code();

        match &self {
            GateError::Internal(e) => error!(
                error_id = %body.error_id,
                error = %e,
                error_kind = e.kind(),
                "Authorization check failed"
            ),
            _ => warn!(
                error_id = %body.error_id,
                status_code = status.as_u16(),
                error = %self,
                "Request rejected by authorization gate"
            ),
        }

        body.into_response_with(status)
    }
}
