//! HTTP front end for the resolver

pub mod auth;
pub mod routes;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::cache::MokaRecordCache;
use crate::resolver::Resolver;

pub use routes::build_router;

/// State shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Same cache the resolver uses, kept here for health stats
    pub cache: Arc<MokaRecordCache>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>, cache: Arc<MokaRecordCache>) -> Self {
        Self { resolver, cache }
    }
}

/// Bind `addr` and serve until Ctrl+C
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "HTTP server listening");

    let cache = Arc::clone(&state.cache);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    cache.log_metrics();
    info!("Shutdown complete.");
    Ok(())
}
