//! Record caching layer
//!
//! Keeps fully assembled file records in memory so repeat lookups skip
//! the upstream round trips entirely.

pub mod record;

pub use record::{CacheError, MokaRecordCache, RecordCache, DEFAULT_CACHE_CAPACITY};
