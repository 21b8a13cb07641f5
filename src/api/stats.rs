use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::analytics::BlogStats;

/// GET /api/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<BlogStats>, ApiError> {
    let stats = state.blogs().stats().await?;
    Ok(Json(stats))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!(error = %e, uptime_secs = state.start_time.elapsed().as_secs(), "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
