//! In-memory stand-ins for the upstream API and the record cache

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheError, RecordCache};
use crate::file::{FileRecord, ProcessingStatus};
use crate::upstream::{DetailsResponse, SegmentResponse, SummaryEntry, UpstreamClient, UpstreamError};

/// Page size the fake listing uses when `limit` is non-positive
pub const FAKE_DEFAULT_PAGE: usize = 5;

/// Scripted upstream that serves a fixed catalog and records every call
#[derive(Default)]
pub struct FakeUpstream {
    catalog: Vec<SummaryEntry>,
    details: HashMap<String, DetailsResponse>,
    segments: HashMap<String, Vec<SegmentResponse>>,
    fail_listing_at: Option<i64>,
    fail_details: bool,
    fail_segments: bool,
    listing_delay: Option<Duration>,
    list_offsets: Mutex<Vec<i64>>,
    list_limits: Mutex<Vec<i64>>,
    details_calls: AtomicUsize,
    segments_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listing row
    pub fn with_entry(mut self, file_id: &str, status: &str) -> Self {
        self.catalog.push(SummaryEntry {
            file_id: file_id.to_string(),
            processing_status: ProcessingStatus::from(status),
        });
        self
    }

    /// Add `count` filler rows that never match a test ID
    pub fn with_filler(mut self, count: usize) -> Self {
        for _ in 0..count {
            let id = format!("filler-{}", self.catalog.len());
            self.catalog.push(SummaryEntry {
                file_id: id,
                processing_status: ProcessingStatus::Finished,
            });
        }
        self
    }

    pub fn with_details(mut self, file_id: &str, file_name: &str) -> Self {
        self.details.insert(
            file_id.to_string(),
            DetailsResponse {
                file_id: file_id.to_string(),
                file_name: file_name.to_string(),
                media_path: format!("https://cdn.test/{}", file_name),
                original_file_path: format!("https://cdn.test/orig/{}", file_name),
                series_title: "Test Series".to_string(),
            },
        );
        self
    }

    pub fn with_segments(mut self, file_id: &str, segments: Vec<SegmentResponse>) -> Self {
        self.segments.insert(file_id.to_string(), segments);
        self
    }

    /// Make the listing call at `offset` fail with a network error
    pub fn failing_listing_at(mut self, offset: i64) -> Self {
        self.fail_listing_at = Some(offset);
        self
    }

    /// Sleep before answering each listing call
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    pub fn failing_details(mut self) -> Self {
        self.fail_details = true;
        self
    }

    pub fn failing_segments(mut self) -> Self {
        self.fail_segments = true;
        self
    }

    /// Offsets of every listing call, in order
    pub fn list_offsets(&self) -> Vec<i64> {
        self.list_offsets.lock().unwrap().clone()
    }

    /// Limits passed to every listing call, in order
    pub fn list_limits(&self) -> Vec<i64> {
        self.list_limits.lock().unwrap().clone()
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    pub fn segments_calls(&self) -> usize {
        self.segments_calls.load(Ordering::SeqCst)
    }

    /// Total upstream calls of any kind
    pub fn total_calls(&self) -> usize {
        self.list_offsets().len() + self.details_calls() + self.segments_calls()
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn list_summaries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SummaryEntry>, UpstreamError> {
        self.list_offsets.lock().unwrap().push(offset);
        self.list_limits.lock().unwrap().push(limit);
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_listing_at == Some(offset) {
            return Err(UpstreamError::Network("connection reset".to_string()));
        }

        let size = if limit > 0 { limit as usize } else { FAKE_DEFAULT_PAGE };
        let start = (offset.max(0) as usize).min(self.catalog.len());
        let end = (start + size).min(self.catalog.len());
        Ok(self.catalog[start..end].to_vec())
    }

    async fn fetch_details(&self, file_id: &str) -> Result<DetailsResponse, UpstreamError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_details {
            return Err(UpstreamError::Server(500, "details unavailable".to_string()));
        }
        self.details
            .get(file_id)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(file_id.to_string()))
    }

    async fn fetch_segments(&self, file_id: &str) -> Result<Vec<SegmentResponse>, UpstreamError> {
        self.segments_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_segments {
            return Err(UpstreamError::Timeout);
        }
        Ok(self.segments.get(file_id).cloned().unwrap_or_default())
    }
}

/// Build a segment response for tests
pub fn segment(id: i64, file_id: &str, text: &str, start: i64, end: i64) -> SegmentResponse {
    SegmentResponse {
        file_segment_id: id,
        file_id: file_id.to_string(),
        segment_text: text.to_string(),
        start_time: start,
        end_time: end,
    }
}

/// HashMap-backed cache that counts writes and can refuse them
#[derive(Default)]
pub struct FakeCache {
    records: Mutex<HashMap<String, Arc<FileRecord>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        let cache = Self::default();
        cache.fail_writes.store(true, Ordering::SeqCst);
        cache
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl RecordCache for FakeCache {
    fn get(&self, file_id: &str) -> Result<Arc<FileRecord>, CacheError> {
        self.records
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or(CacheError::Miss)
    }

    fn set(&self, file_id: &str, record: Arc<FileRecord>) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Write("store unavailable".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(file_id.to_string(), record);
        Ok(())
    }
}
