//! Content-processing API client
//!
//! Read-only access to the three upstream endpoints the resolver needs:
//! the paged file listing, file details, and file segments.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

use super::errors::UpstreamError;
use super::types::{DetailsResponse, SegmentResponse, SummaryEntry};

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the resolver needs from the upstream service
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch one page of the file listing
    ///
    /// A non-positive `limit` leaves the page size to the service.
    /// An empty page means there is nothing at or past `offset`.
    async fn list_summaries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SummaryEntry>, UpstreamError>;

    /// Fetch name, paths and title for a known file ID
    async fn fetch_details(&self, file_id: &str) -> Result<DetailsResponse, UpstreamError>;

    /// Fetch the ordered segment list for a known file ID
    async fn fetch_segments(&self, file_id: &str) -> Result<Vec<SegmentResponse>, UpstreamError>;
}

/// HTTP implementation backed by reqwest
#[derive(Clone)]
pub struct HttpUpstreamClient {
    http_client: Client,
    base_url: String,
}

impl HttpUpstreamClient {
    /// Create a client for the given base URL
    ///
    /// # Arguments
    /// * `base_url` - Scheme and host of the API, e.g. `http://api.example.com`
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a URL and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        debug!(url = %url, query = ?query, "Querying upstream");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Failed to query endpoint");
                UpstreamError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = status, "Upstream returned an error status");
            return Err(UpstreamError::from_status(status, &body));
        }

        response.json::<T>().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to read JSON body");
            UpstreamError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn list_summaries(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SummaryEntry>, UpstreamError> {
        let url = format!("{}/api/file/all", self.base_url);

        let mut query = Vec::new();
        if limit > 0 {
            query.push(("limit", limit.to_string()));
        }
        if offset > 0 {
            query.push(("offset", offset.to_string()));
        }

        self.get_json(&url, &query).await
    }

    async fn fetch_details(&self, file_id: &str) -> Result<DetailsResponse, UpstreamError> {
        let url = format!(
            "{}/api/file/details/{}",
            self.base_url,
            urlencoding::encode(file_id)
        );
        self.get_json(&url, &[]).await
    }

    async fn fetch_segments(&self, file_id: &str) -> Result<Vec<SegmentResponse>, UpstreamError> {
        let url = format!(
            "{}/api/file/segments/{}",
            self.base_url,
            urlencoding::encode(file_id)
        );
        self.get_json(&url, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::ProcessingStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpUpstreamClient {
        HttpUpstreamClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpUpstreamClient::new("http://localhost:9000/", DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_list_first_page_omits_zero_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/all"))
            .and(query_param_is_missing("limit"))
            .and(query_param_is_missing("offset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"fileId": "a", "processingStatus": "FINISHED"},
                {"fileId": "b", "processingStatus": "PROCESSING"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list_summaries(0, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].file_id, "a");
        assert_eq!(page[1].processing_status, ProcessingStatus::Processing);
    }

    #[tokio::test]
    async fn test_list_sends_limit_and_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/all"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list_summaries(20, 10).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_details_and_segments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/details/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fileId": "abc",
                "fileName": "x.mp3",
                "mp3Path": "/m/x.mp3",
                "originalFilePath": "/o/x.wav",
                "seriesTitle": "S1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/file/segments/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"fileSegmentId": 2, "fileId": "abc", "segmentText": "second", "startTime": 10, "endTime": 20},
                {"fileSegmentId": 1, "fileId": "abc", "segmentText": "first", "startTime": 0, "endTime": 10}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let details = client.fetch_details("abc").await.unwrap();
        assert_eq!(details.file_name, "x.mp3");
        assert_eq!(details.media_path, "/m/x.mp3");

        let segments = client.fetch_segments("abc").await.unwrap();
        let ids: Vec<i64> = segments.iter().map(|s| s.file_segment_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/details/abc"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_details("abc").await.unwrap_err();
        assert_eq!(err, UpstreamError::Server(503, "maintenance".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_summaries(0, 0).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        // Grab a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            HttpUpstreamClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        assert!(client.list_summaries(0, 0).await.is_err());
    }
}
