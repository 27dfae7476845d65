//! Upstream API Error Types
//!
//! Every variant is a transport-level failure from the resolver's point of view.
//! HTTP status codes are mapped to specific variants so callers can log them usefully.

/// Upstream API error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("Not found upstream: {0}")]
    NotFound(String),

    #[error("Rate limited by upstream")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl UpstreamError {
    /// Create an UpstreamError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => UpstreamError::NotFound(body.to_string()),
            408 | 504 => UpstreamError::Timeout,
            429 => UpstreamError::RateLimited,
            500..=599 => UpstreamError::Server(status, body.to_string()),
            _ => UpstreamError::Request(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else if err.is_connect() || err.is_request() {
            UpstreamError::Network(err.to_string())
        } else {
            UpstreamError::Request(err.to_string())
        }
    }
}
