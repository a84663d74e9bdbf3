//! Users CRUD handlers
//!
//! Each route is gated before its handler runs, so handlers only deal with
//! validation, storage and relationship upkeep.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer};
use tracing::info;
use validator::Validate;

use auth_gateway::Actor;

use crate::{
    error::{api_message, api_success, ApiError, ApiResponse},
    server::AppState,
    store::{NewUser, User, UserChanges},
};

/// Surrounding whitespace is dropped before any rule is checked
fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Name is required"),
        length(min = 2, max = 255, message = "Name must be between 2 and 255 characters")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(
        min = 2,
        max = 255,
        message = "Name must be between 2 and 255 characters"
    ))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,
}

/// Record ids are numeric; anything else cannot name a stored user
fn parse_id(id: &str) -> Result<u64, ApiError> {
    id.trim().parse().map_err(|_| ApiError::not_found("User"))
}

pub async fn list_users(State(state): State<AppState>) -> Json<ApiResponse<Vec<User>>> {
    let users = state.store.list().await;
    let count = users.len();
    Json(api_success(users).with_count(count))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .store
        .get(parse_id(&id)?)
        .await
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(api_success(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let (Some(name), Some(email)) = (request.name, request.email) else {
        return Err(ApiError::validation("Name and email are required"));
    };

    let user = state
        .store
        .create(NewUser { name, email })
        .await?;
    info!(user_id = user.id, created_by = %actor, "User created");

    state
        .lifecycle
        .on_resource_created(&user.id.to_string(), actor.id())
        .await;

    Ok((
        StatusCode::CREATED,
        Json(api_success(user).with_message("User created successfully")),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let changes = UserChanges {
        name: request.name,
        email: request.email,
    };
    let id = parse_id(&id)?;
    if changes.is_empty() {
        // a missing record still reports 404
        state.store.get(id).await.ok_or_else(|| ApiError::not_found("User"))?;
        return Err(ApiError::bad_request("No fields to update"));
    }

    let user = state.store.update(id, changes).await?;
    info!(user_id = user.id, "User updated");
    Ok(Json(api_success(user).with_message("User updated successfully")))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = state.store.delete(parse_id(&id)?).await?;
    info!(user_id = user.id, "User deleted");

    state.lifecycle.on_resource_deleted(&user.id.to_string()).await;

    Ok(Json(api_message("User deleted successfully")))
}
