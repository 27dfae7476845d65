//! Authorization gate for protected routes
//!
//! Only checks that an `Authorization` header is present and non-empty.
//! No token validation is performed.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

/// Reject requests without an `Authorization` header with 403
pub async fn require_authorization(request: Request, next: Next) -> Response {
    let has_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| !value.is_empty())
        .unwrap_or(false);

    if !has_header {
        debug!(path = %request.uri().path(), "Unauthorized request with empty Authorization header");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    next.run(request).await
}
