//! Record Cache Implementation
//!
//! Maps file IDs to fully assembled records. The production cache is a
//! bounded Moka cache; entries are shared as `Arc<FileRecord>` and never
//! mutated after insertion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, trace};

use crate::file::FileRecord;

/// Default maximum number of cached records
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Record cache errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// No entry for the requested ID
    #[error("cache miss")]
    Miss,

    /// The backing store rejected a write
    #[error("cache write failed: {0}")]
    Write(String),
}

/// Key-value store of assembled records keyed by file ID
pub trait RecordCache: Send + Sync {
    /// Look up a record, failing with `CacheError::Miss` when absent
    fn get(&self, file_id: &str) -> Result<Arc<FileRecord>, CacheError>;

    /// Store a record, overwriting any existing entry
    fn set(&self, file_id: &str, record: Arc<FileRecord>) -> Result<(), CacheError>;
}

/// Hit/miss counters and current size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Hit rate as a percentage (0.0 when nothing has been looked up)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Bounded in-memory record cache
pub struct MokaRecordCache {
    records: Cache<String, Arc<FileRecord>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MokaRecordCache {
    /// Create a cache with the default capacity and no TTL
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, None)
    }

    /// Create a cache with custom bounds
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of records kept
    /// * `ttl` - Optional time-to-live for each record
    pub fn with_config(capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::<String, Arc<FileRecord>>::builder()
            .max_capacity(capacity)
            .name("file_record_cache");
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            records: builder.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current counters
    ///
    /// Entry count is approximate until pending maintenance runs.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.records.entry_count(),
        }
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let stats = self.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.1}%", stats.hit_rate()),
            entries = stats.entries,
            "Record cache metrics"
        );
    }
}

impl Default for MokaRecordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCache for MokaRecordCache {
    fn get(&self, file_id: &str) -> Result<Arc<FileRecord>, CacheError> {
        match self.records.get(file_id) {
            Some(record) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(file_id = file_id, "Cache HIT for record");
                Ok(record)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(file_id = file_id, "Cache MISS for record");
                Err(CacheError::Miss)
            }
        }
    }

    fn set(&self, file_id: &str, record: Arc<FileRecord>) -> Result<(), CacheError> {
        self.records.insert(file_id.to_string(), record);
        debug!(file_id = file_id, "Saved record to cache");
        Ok(())
    }
}
