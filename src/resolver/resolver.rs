//! File Resolver
//!
//! Turns a file ID into a fully assembled record. Cached records are
//! returned straight away; otherwise the ID is located through the paged
//! upstream listing, details and segments are fetched, and the finished
//! record is cached.
//!
//! The upstream listing has no lookup-by-id endpoint, so locating an ID
//! costs one listing call per page up to the page that contains it.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::errors::ResolveError;
use crate::cache::RecordCache;
use crate::file::{FileRecord, Segment};
use crate::upstream::{find_by_id, SummaryEntry, UpstreamClient, UpstreamError};

/// Rows per listing page when the upstream picks the page size
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// What to do when a listing page request fails mid-search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingErrorPolicy {
    /// Surface the transport error to the caller
    #[default]
    Propagate,
    /// Report the file as not found (legacy behaviour)
    TreatAsNotFound,
}

impl FromStr for PagingErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(PagingErrorPolicy::Propagate),
            "not-found" | "not_found" | "notfound" => Ok(PagingErrorPolicy::TreatAsNotFound),
            other => Err(format!(
                "unknown paging error policy '{}' (expected 'propagate' or 'not-found')",
                other
            )),
        }
    }
}

/// Tunables for the lookup
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Rows requested per listing page, also the offset step
    pub page_size: i64,
    /// Stop the scan with NotFound after this many pages
    pub max_pages: Option<usize>,
    pub paging_error_policy: PagingErrorPolicy,
    /// Upper bound on a whole uncached resolution
    pub lookup_timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            paging_error_policy: PagingErrorPolicy::default(),
            lookup_timeout: None,
        }
    }
}

/// Resolves file IDs to records through the cache and the upstream API
pub struct Resolver {
    upstream: Arc<dyn UpstreamClient>,
    cache: Arc<dyn RecordCache>,
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with default settings
    pub fn new(upstream: Arc<dyn UpstreamClient>, cache: Arc<dyn RecordCache>) -> Self {
        Self::with_config(upstream, cache, ResolverConfig::default())
    }

    pub fn with_config(
        upstream: Arc<dyn UpstreamClient>,
        cache: Arc<dyn RecordCache>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            upstream,
            cache,
            config,
        }
    }

    /// Resolve a file ID to its assembled record
    ///
    /// # Errors
    /// * `NotFound` - the ID is on no listing page
    /// * `NotFinished` - the ID exists but is still processing
    /// * `Transport` - an upstream request failed
    /// * `Cancelled` - the lookup deadline passed
    pub async fn resolve(&self, file_id: &str) -> Result<Arc<FileRecord>, ResolveError> {
        self.resolve_with_cancel(file_id, &CancellationToken::new())
            .await
    }

    /// Resolve a file ID, giving up with `Cancelled` once `cancel` fires
    ///
    /// The token is checked between listing pages and raced against every
    /// upstream request.
    pub async fn resolve_with_cancel(
        &self,
        file_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<FileRecord>, ResolveError> {
        if let Ok(record) = self.cache.get(file_id) {
            debug!(file_id = file_id, "Found record in cache");
            return Ok(record);
        }

        let result = match self.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, self.resolve_uncached(file_id, cancel))
                .await
                .unwrap_or_else(|_| {
                    warn!(
                        file_id = file_id,
                        timeout = ?limit,
                        "Lookup deadline exceeded"
                    );
                    Err(ResolveError::Cancelled)
                }),
            None => self.resolve_uncached(file_id, cancel).await,
        };

        if let Err(e) = &result {
            debug!(file_id = file_id, kind = e.kind(), error = %e, "Resolution failed");
        }
        result
    }

    async fn resolve_uncached(
        &self,
        file_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<FileRecord>, ResolveError> {
        let summary = self.find_summary(file_id, cancel).await?;

        if !summary.processing_status.is_finished() {
            warn!(
                file_id = file_id,
                status = %summary.processing_status,
                "File is not finished processing"
            );
            return Err(ResolveError::NotFinished {
                file_id: summary.file_id,
                status: summary.processing_status,
            });
        }

        let details = async {
            self.upstream
                .fetch_details(&summary.file_id)
                .await
                .map_err(|e| {
                    error!(file_id = file_id, error = %e, "Failed to query file details");
                    e
                })
        };
        let segments = async {
            self.upstream
                .fetch_segments(&summary.file_id)
                .await
                .map_err(|e| {
                    error!(file_id = file_id, error = %e, "Failed to query file segments");
                    e
                })
        };
        let (details, segments) =
            with_cancel(cancel, async { tokio::try_join!(details, segments) }).await?;

        let record = Arc::new(FileRecord {
            file_id: summary.file_id,
            processing_status: summary.processing_status,
            file_name: details.file_name,
            media_path: details.media_path,
            original_file_path: details.original_file_path,
            series_title: details.series_title,
            segments: segments.into_iter().map(Segment::from).collect(),
        });

        if let Err(e) = self.cache.set(file_id, Arc::clone(&record)) {
            error!(file_id = file_id, error = %e, "Failed to save record to cache");
        }

        info!(
            file_id = file_id,
            segments = record.segments.len(),
            "Resolved file record"
        );
        Ok(record)
    }

    /// Scan the listing page by page until the ID shows up or a page comes back empty
    async fn find_summary(
        &self,
        file_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SummaryEntry, ResolveError> {
        let mut offset: i64 = 0;
        let mut pages: usize = 0;
        let limit = self.listing_limit();

        loop {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            if let Some(max_pages) = self.config.max_pages {
                if pages >= max_pages {
                    warn!(file_id = file_id, pages = pages, "Giving up lookup at page limit");
                    return Err(ResolveError::NotFound(file_id.to_string()));
                }
            }

            debug!(file_id = file_id, offset = offset, "Fetching listing page");
            let page = match with_cancel(cancel, self.upstream.list_summaries(limit, offset)).await {
                Ok(page) => page,
                Err(ResolveError::Transport(e)) => {
                    return Err(self.paging_failure(file_id, offset, e));
                }
                Err(e) => return Err(e),
            };
            pages += 1;

            if page.is_empty() {
                debug!(file_id = file_id, pages = pages, "Reached end of listing");
                return Err(ResolveError::NotFound(file_id.to_string()));
            }

            if let Some(entry) = find_by_id(&page, file_id) {
                debug!(file_id = file_id, pages = pages, status = %entry.processing_status, "Located file in listing");
                return Ok(entry.clone());
            }

            offset += self.config.page_size;
        }
    }

    /// Limit sent with each listing call
    ///
    /// The default page size matches the service default, so no limit is
    /// sent; any other size is requested explicitly to keep the offset step
    /// and the returned page the same length.
    fn listing_limit(&self) -> i64 {
        if self.config.page_size == DEFAULT_PAGE_SIZE {
            0
        } else {
            self.config.page_size
        }
    }

    fn paging_failure(&self, file_id: &str, offset: i64, err: UpstreamError) -> ResolveError {
        match self.config.paging_error_policy {
            PagingErrorPolicy::Propagate => {
                error!(file_id = file_id, offset = offset, error = %err, "Failed to fetch listing page");
                ResolveError::Transport(err)
            }
            PagingErrorPolicy::TreatAsNotFound => {
                warn!(
                    file_id = file_id,
                    offset = offset,
                    error = %err,
                    "Listing page failed, reporting file as not found"
                );
                ResolveError::NotFound(file_id.to_string())
            }
        }
    }
}

/// Run an upstream request unless `cancel` fires first
async fn with_cancel<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ResolveError::Cancelled),
        res = fut => res.map_err(ResolveError::from),
    }
}
