use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use auth_gateway::ErrorBody;

use crate::store::StoreError;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(flatten)]
    pub body: ErrorBody,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<BTreeMap<String, Vec<String>>>,
    },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("Route {path} not found")]
    RouteNotFound { path: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    BadRequest { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } | ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error kind string
    pub fn error_kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "Validation Error",
            ApiError::NotFound { .. } | ApiError::RouteNotFound { .. } => "Not Found",
            ApiError::Conflict { .. } => "Conflict",
            ApiError::BadRequest { .. } => "Bad Request",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found("User"),
            StoreError::DuplicateEmail => ApiError::conflict(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is invalid ({})", field, e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        let message = field_errors
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "Invalid request".to_string());

        ApiError::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.error_kind(), Some(self.to_string()));
        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };
        let status_code = self.status_code();

        warn!(
            error_id = %body.error_id,
            status_code = status_code.as_u16(),
            error = %self,
            "Request failed"
        );

        let response = ApiErrorResponse { body, field_errors };
        (status_code, Json(response)).into_response()
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        message: None,
        data: Some(data),
        count: None,
    }
}

/// Successful response carrying only a message
pub fn api_message(message: impl Into<String>) -> ApiResponse<()> {
    ApiResponse {
        success: true,
        message: Some(message.into()),
        data: None,
        count: None,
    }
}

impl<T> ApiResponse<T> {
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(ApiError::from(StoreError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(StoreError::DuplicateEmail).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(StoreError::NotFound).to_string(), "User not found");
    }
}
