//! Request logging, metrics and response headers for the HTTP layer.
//!
//! Every request runs inside a `request` span. [`AuthenticatedUser`] records
//! the caller's id into that span, so the finishing event of an authenticated
//! request carries `user_id`.
//!
//! [`AuthenticatedUser`]: super::auth::AuthenticatedUser

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::api::AppState;

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// Metrics label for a request path.
///
/// Blog and user ids collapse to `{id}`; paths outside the API surface share
/// one `unmatched` label.
fn route_label(path: &str) -> String {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match segments.as_slice() {
        ["health" | "metrics"] | ["api", "users" | "blogs" | "login" | "stats"] => {
            format!("/{}", segments.join("/"))
        }
        ["api", resource @ ("users" | "blogs"), _] => format!("/api/{resource}/{{id}}"),
        _ => "unmatched".to_string(),
    }
}

fn outcome(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "unauthenticated",
        StatusCode::FORBIDDEN => "forbidden",
        s if s.is_server_error() => "error",
        s if s.is_client_error() => "client_error",
        _ => "success",
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let method = req.method().to_string();
    let route = route_label(req.uri().path());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        route = %route,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status();
        let outcome = outcome(status);

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "route" => route.clone(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => method,
            "route" => route.clone()
        )
        .record(elapsed.as_secs_f64());

        if matches!(outcome, "unauthenticated" | "forbidden") {
            metrics::counter!("auth_rejections_total", "route" => route, "reason" => outcome)
                .increment(1);
            warn!(status_code = status.as_u16(), reason = outcome, "Request rejected by auth");
        }

        info!(
            status_code = status.as_u16(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// The API only serves JSON, so nothing may be framed or embedded.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label_collapses_ids() {
        let id = Uuid::new_v4();

        assert_eq!(route_label(&format!("/api/blogs/{id}")), "/api/blogs/{id}");
        assert_eq!(route_label(&format!("/api/users/{id}")), "/api/users/{id}");
        assert_eq!(route_label("/api/blogs/not-an-id"), "/api/blogs/{id}");
    }

    #[test]
    fn test_route_label_keeps_fixed_routes() {
        assert_eq!(route_label("/api/blogs"), "/api/blogs");
        assert_eq!(route_label("/api/login"), "/api/login");
        assert_eq!(route_label("/api/stats"), "/api/stats");
        assert_eq!(route_label("/health"), "/health");
    }

    #[test]
    fn test_route_label_groups_unknown_paths() {
        assert_eq!(route_label("/api/nothing-here"), "unmatched");
        assert_eq!(route_label("/wp-admin/setup.php"), "unmatched");
        assert_eq!(route_label("/"), "unmatched");
    }

    #[test]
    fn test_outcome_separates_auth_failures() {
        assert_eq!(outcome(StatusCode::UNAUTHORIZED), "unauthenticated");
        assert_eq!(outcome(StatusCode::FORBIDDEN), "forbidden");
        assert_eq!(outcome(StatusCode::BAD_REQUEST), "client_error");
        assert_eq!(outcome(StatusCode::SERVICE_UNAVAILABLE), "error");
        assert_eq!(outcome(StatusCode::NO_CONTENT), "success");
    }
}
