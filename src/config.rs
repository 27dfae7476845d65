//! Service configuration
//!
//! Settings come from environment variables; `--upstream` and `--listen`
//! on the command line override the matching variables.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::resolver::{PagingErrorPolicy, ResolverConfig, DEFAULT_PAGE_SIZE};
use crate::upstream::DEFAULT_REQUEST_TIMEOUT;

/// Default content-processing API
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://interview-api.snackable.ai";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub upstream_base_url: String,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
    pub cache_capacity: u64,
    pub cache_ttl: Option<Duration>,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration using `lookup` to read each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upstream_base_url = get("UPSTREAM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let listen_addr = parse_listen_addr(
            &get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        let request_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number(&v, "UPSTREAM_TIMEOUT_SECS")?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let page_size = match get("PAGE_SIZE") {
            Some(v) => {
                let size: i64 = parse_number(&v, "PAGE_SIZE")?;
                if size <= 0 {
                    return Err(anyhow!("PAGE_SIZE must be positive, got {}", size));
                }
                size
            }
            None => DEFAULT_PAGE_SIZE,
        };

        let max_pages = get("MAX_PAGES")
            .map(|v| parse_number::<usize>(&v, "MAX_PAGES"))
            .transpose()?;

        let paging_error_policy = match get("PAGING_ERROR_POLICY") {
            Some(v) => v
                .parse::<PagingErrorPolicy>()
                .map_err(|e| anyhow!("Invalid PAGING_ERROR_POLICY: {}", e))?,
            None => PagingErrorPolicy::default(),
        };

        let cache_capacity = match get("CACHE_CAPACITY") {
            Some(v) => parse_number(&v, "CACHE_CAPACITY")?,
            None => DEFAULT_CACHE_CAPACITY,
        };

        let cache_ttl = get("CACHE_TTL_SECS")
            .map(|v| parse_number(&v, "CACHE_TTL_SECS").map(Duration::from_secs))
            .transpose()?;

        let lookup_timeout = get("LOOKUP_TIMEOUT_SECS")
            .map(|v| parse_number(&v, "LOOKUP_TIMEOUT_SECS").map(Duration::from_secs))
            .transpose()?;

        Ok(Self {
            upstream_base_url,
            listen_addr,
            request_timeout,
            cache_capacity,
            cache_ttl,
            resolver: ResolverConfig {
                page_size,
                max_pages,
                paging_error_policy,
                lookup_timeout,
            },
        })
    }

    /// Override the upstream base URL
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.upstream_base_url = base_url.to_string();
        self
    }

    /// Override the listen address
    pub fn with_listen_addr(mut self, addr: &str) -> Result<Self> {
        self.listen_addr = parse_listen_addr(addr)?;
        Ok(self)
    }
}

fn parse_listen_addr(value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", value))
}

fn parse_number<T>(value: &str, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("Invalid {} '{}'", name, value))
}
