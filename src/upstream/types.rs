//! Upstream API response types
//!
//! Wire shapes returned by the content-processing API, plus the mapping
//! from segment responses to domain segments.

use serde::{Deserialize, Serialize};

use crate::file::{ProcessingStatus, Segment};

/// One row of the paged `/api/file/all` listing
///
/// Only used to locate a file ID during lookup, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub file_id: String,
    pub processing_status: ProcessingStatus,
}

/// Find an entry by file ID within a listing page
pub fn find_by_id<'a>(page: &'a [SummaryEntry], file_id: &str) -> Option<&'a SummaryEntry> {
    page.iter().find(|entry| entry.file_id == file_id)
}

/// Response from `/api/file/details/{fileId}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default, rename = "mp3Path")]
    pub media_path: String,
    #[serde(default)]
    pub original_file_path: String,
    #[serde(default)]
    pub series_title: String,
}

/// One element of the `/api/file/segments/{fileId}` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResponse {
    pub file_segment_id: i64,
    pub file_id: String,
    #[serde(default)]
    pub segment_text: String,
    pub start_time: i64,
    pub end_time: i64,
}

impl From<SegmentResponse> for Segment {
    fn from(seg: SegmentResponse) -> Self {
        Segment {
            file_segment_id: seg.file_segment_id,
            file_id: seg.file_id,
            segment_text: seg.segment_text,
            start_time: seg.start_time,
            end_time: seg.end_time,
        }
    }
}
