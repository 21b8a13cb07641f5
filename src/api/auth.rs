use axum::{
    Json,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::{header, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::Principal;
use crate::services::LoginResult;

// ============================================================================
// Extractor
// ============================================================================

/// The verified principal of a request carrying `Authorization: Bearer <token>`.
///
/// Handlers that take this extractor reject unauthenticated requests with 401
/// before their body runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let principal = state.guard().authenticate(header)?;
        tracing::Span::current().record("user_id", tracing::field::display(&principal.id));

        Ok(Self(principal))
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
/// Exchange username and password for a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResult>, ApiError> {
    let Json(payload) = payload?;

    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::unauthorized(crate::constants::messages::INVALID_LOGIN));
    }

    let result = state
        .users()
        .login(&payload.username, &payload.password)
        .await?;

    tracing::info!(username = %result.username, "User logged in");
    Ok(Json(result))
}
