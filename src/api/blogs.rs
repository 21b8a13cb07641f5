use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthenticatedUser;
use super::{ApiError, AppState, BlogDto};
use crate::services::BlogInput;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLikesRequest {
    pub likes: Option<i64>,
}

/// GET /api/blogs
pub async fn list_blogs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BlogDto>>, ApiError> {
    let blogs = state.blogs().list_blogs().await?;
    Ok(Json(blogs.into_iter().map(BlogDto::from).collect()))
}

/// GET /api/blogs/{id}
pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BlogDto>, ApiError> {
    let blog = state.blogs().get_blog(&id).await?;
    Ok(Json(blog.into()))
}

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    payload: Result<Json<BlogInput>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogDto>), ApiError> {
    let Json(input) = payload?;

    let created = state.blogs().create_blog(&principal, input).await?;
    tracing::info!(blog_id = %created.blog.id, "Blog created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// DELETE /api/blogs/{id}
pub async fn delete_blog(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.blogs().delete_blog(&principal, &id).await?;
    tracing::info!(blog_id = %id, "Blog deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/blogs/{id}
///
/// Anyone may set the like count; no token is read here.
pub async fn update_likes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateLikesRequest>, JsonRejection>,
) -> Result<Json<BlogDto>, ApiError> {
    // An unreadable body is reported after the id, as a missing `likes`.
    let likes = payload.ok().and_then(|Json(body)| body.likes);

    let blog = state.blogs().update_likes(&id, likes).await?;
    Ok(Json(blog.into()))
}
