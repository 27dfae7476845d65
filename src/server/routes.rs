//! HTTP routes
//!
//! `GET /file/:fileid` and `GET /protected/file/:fileid` both resolve a file
//! record; the protected variant sits behind the authorization gate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use super::auth::require_authorization;
use super::AppState;
use crate::file::FileRecord;
use crate::resolver::ResolveError;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/protected/file/:fileid", get(get_file))
        .layer(middleware::from_fn(require_authorization));

    Router::new()
        .route("/file/:fileid", get(get_file))
        .route("/health", get(health_check))
        .merge(protected)
        .with_state(state)
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let status = match &self {
            ResolveError::NotFound(_) => StatusCode::NOT_FOUND,
            ResolveError::NotFinished { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ResolveError::Transport(_) => StatusCode::BAD_GATEWAY,
            ResolveError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        };

        let body = match &self {
            ResolveError::NotFinished { .. } => self.to_string(),
            _ => status.canonical_reason().unwrap_or("Error").to_string(),
        };

        (status, body).into_response()
    }
}

/// GET /file/:fileid
async fn get_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<Arc<FileRecord>>, ResolveError> {
    match state.resolver.resolve(&file_id).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            match &e {
                ResolveError::NotFound(_) => debug!(file_id = %file_id, "Unknown ID requested"),
                ResolveError::NotFinished { .. } => debug!(file_id = %file_id, "Unfinished file requested"),
                _ => error!(file_id = %file_id, error = %e, "Failed to resolve file"),
            }
            Err(e)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub cache: CacheHealth,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: CacheHealth {
            hits: stats.hits,
            misses: stats.misses,
            entries: stats.entries,
        },
    })
}
