//! File record types
//!
//! The assembled record returned to callers and stored in the record cache.
//! Field names serialize in camelCase to match the upstream API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status string used by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessingStatus {
    /// Terminal status, details and segments are available
    Finished,
    /// Upstream is still working on the file
    Processing,
    /// Any status value we don't know about (kept verbatim)
    Other(String),
}

impl ProcessingStatus {
    pub const FINISHED: &'static str = "FINISHED";
    pub const PROCESSING: &'static str = "PROCESSING";

    /// Whether this is the terminal status
    pub fn is_finished(&self) -> bool {
        matches!(self, ProcessingStatus::Finished)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcessingStatus::Finished => Self::FINISHED,
            ProcessingStatus::Processing => Self::PROCESSING,
            ProcessingStatus::Other(s) => s,
        }
    }
}

impl From<String> for ProcessingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::FINISHED => ProcessingStatus::Finished,
            Self::PROCESSING => ProcessingStatus::Processing,
            _ => ProcessingStatus::Other(value),
        }
    }
}

impl From<&str> for ProcessingStatus {
    fn from(value: &str) -> Self {
        ProcessingStatus::from(value.to_string())
    }
}

impl From<ProcessingStatus> for String {
    fn from(value: ProcessingStatus) -> Self {
        match value {
            ProcessingStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed text span belonging to a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Segment ID, unique within its file
    pub file_segment_id: i64,
    /// Parent file ID (back-reference only)
    pub file_id: String,
    pub segment_text: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// Fully assembled file record
///
/// Built fresh on every cache miss and never mutated afterwards.
/// Only records with a finished status are ever cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_id: String,
    pub processing_status: ProcessingStatus,
    pub file_name: String,
    #[serde(rename = "mp3Path")]
    pub media_path: String,
    pub original_file_path: String,
    pub series_title: String,
    pub segments: Vec<Segment>,
}
