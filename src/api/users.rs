use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::AuthenticatedUser;
use super::{ApiError, AppState, UserDto};
use crate::services::UserInput;

/// POST /api/users
/// Register a new account. The password hash never leaves the service layer.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(input) = payload?;

    let user = state.users().register(input).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.users().list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.users().delete_user(&principal, &id).await?;
    tracing::info!(user_id = %id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
