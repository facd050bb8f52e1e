mod admin;
mod middleware;
mod public;

pub use admin::{AdminState, build_admin_router};
pub use public::{HttpState, build_router};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::{ErrorReport, HttpError};
use crate::application::repos::{HealthRepo, RepoError};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// `204` while the upstream API answers its health check, `503` otherwise.
async fn upstream_health_response(health: &Arc<dyn HealthRepo>) -> Response {
    match health.ping().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::upstream_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Whether `target` is a same-site path safe to use as a redirect `Location`.
///
/// Browsers read `/\\host` like `//host` and drop tabs and newlines before resolving, so both
/// backslashes and control characters disqualify a target.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}

/// Map a repository error to a consistent HTTP error for admin and public surfaces.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::Unauthorized => HttpError::new(
            source,
            StatusCode::UNAUTHORIZED,
            "Session expired",
            "upstream rejected the session token",
        ),
        RepoError::InvalidInput { message } => {
            HttpError::new(source, StatusCode::BAD_REQUEST, "Invalid input", message)
        }
        RepoError::Rejected { status, message } => {
            let status = StatusCode::from_u16(status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY);
            HttpError::new(source, status, "Upstream rejected the request", message)
        }
        err @ RepoError::Unavailable(_) => HttpError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            &err,
        ),
        err @ RepoError::Decode(_) => HttpError::from_error(
            source,
            StatusCode::BAD_GATEWAY,
            "Unexpected upstream response",
            &err,
        ),
    }
}
