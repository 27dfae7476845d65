//! Content-processing API client

pub mod client;
pub mod errors;
pub mod types;

pub use client::{HttpUpstreamClient, UpstreamClient, DEFAULT_REQUEST_TIMEOUT};
pub use errors::UpstreamError;
pub use types::*;
