//! Resolver error types

use crate::file::ProcessingStatus;
use crate::upstream::UpstreamError;

/// Reasons a file ID could not be resolved to a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The ID is absent from every page of the upstream listing
    #[error("file not found: {0}")]
    NotFound(String),

    /// The ID exists but upstream processing has not finished
    #[error("file not finished")]
    NotFinished {
        file_id: String,
        status: ProcessingStatus,
    },

    /// Network or decoding failure talking to upstream
    #[error("upstream request failed: {0}")]
    Transport(#[from] UpstreamError),

    /// The caller cancelled or the lookup deadline passed
    #[error("resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "not_found",
            ResolveError::NotFinished { .. } => "not_finished",
            ResolveError::Transport(_) => "transport",
            ResolveError::Cancelled => "cancelled",
        }
    }
}
