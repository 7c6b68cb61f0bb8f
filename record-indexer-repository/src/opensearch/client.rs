//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    http::headers::DEFAULT_USER_AGENT,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::bulk::{parse_bulk_response, parse_error_response};
use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::types::{BulkOutcome, SearchHit, SearchHits, StoreInfo};

/// OpenSearch document store.
///
/// # Example
///
/// ```ignore
/// let store = OpenSearchStore::new("http://localhost:9200", Some(Duration::from_secs(60)))?;
/// let info = store.info().await?;
/// println!("connected to {} {}", info.cluster_name, info.version);
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    request_timeout: Option<Duration>,
}

impl OpenSearchStore {
    /// Version of the OpenSearch client library in use.
    pub fn client_version() -> &'static str {
        DEFAULT_USER_AGENT.trim_start_matches("opensearch-rs/")
    }

    /// Create a new store client for the given URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The server URL (e.g., "http://localhost:9200")
    /// * `request_timeout` - Optional timeout applied to every request
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new client instance
    /// * `Err(StoreError)` - If the URL is invalid or the transport can't be built
    pub fn new(url: &str, request_timeout: Option<Duration>) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        info!(url = %url, timeout = ?request_timeout, "Created OpenSearch client");

        Ok(Self {
            client: OpenSearch::new(transport),
            request_timeout,
        })
    }

    fn map_send_error(&self, err: opensearch::Error) -> StoreError {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => StoreError::Timeout(timeout),
            _ => StoreError::transport(err.to_string()),
        }
    }

    /// Turn a non-success response into a decoded rejection.
    async fn rejection(response: Response) -> StoreError {
        let status = response.status_code().as_u16();
        let body = response.text().await.unwrap_or_default();
        parse_error_response(status, &body)
    }

    /// Parse the root endpoint response.
    fn parse_info(body: &Value) -> Result<StoreInfo, StoreError> {
        let version = body
            .get("version")
            .and_then(|v| v.get("number"))
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::parse("info response has no version.number"))?;

        Ok(StoreInfo {
            cluster_name: body
                .get("cluster_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            version: version.to_string(),
            distribution: body
                .get("version")
                .and_then(|v| v.get("distribution"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Parse a search response.
    ///
    /// `hits.total` is an object (`{"value": n}`) on 7.x-compatible servers and
    /// a bare number on older ones.
    fn parse_search_response(body: &Value) -> SearchHits {
        let hits = body.get("hits");
        let total = hits
            .and_then(|h| h.get("total"))
            .and_then(|t| t.get("value").and_then(Value::as_u64).or_else(|| t.as_u64()))
            .unwrap_or(0);

        let hits = hits
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(Self::parse_hit).collect())
            .unwrap_or_default();

        SearchHits {
            total,
            took_ms: body.get("took").and_then(Value::as_u64).unwrap_or(0),
            hits,
        }
    }

    fn parse_hit(hit: &Value) -> Option<SearchHit> {
        Some(SearchHit {
            id: hit.get("_id")?.as_str()?.to_string(),
            source: hit.get("_source").cloned().unwrap_or(Value::Null),
        })
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn info(&self) -> Result<StoreInfo, StoreError> {
        let response = self
            .client
            .info()
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status_code().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Self::parse_info(&body)
    }

    #[instrument(skip(self, settings))]
    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<(), StoreError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if exists.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(settings)
            .send()
            .await
            .map_err(|e| StoreError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Another loader may have created it between the two calls.
            if body.contains("resource_already_exists_exception") {
                return Ok(());
            }
            error!(status = %status, body = %body, "Index creation failed");
            return Err(StoreError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                index, status, body
            )));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    async fn bulk(&self, index: &str, body: &[u8]) -> Result<BulkOutcome, StoreError> {
        // The client terminates every body part with a newline itself.
        let payload = body.strip_suffix(b"\n").unwrap_or(body);

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(vec![payload])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status_code().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Ok(parse_bulk_response(&body))
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .refresh(Refresh::True)
            .body(document)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status_code().is_success() {
            return Err(Self::rejection(response).await);
        }

        debug!(index = %index, doc_id = %id, "Document indexed");
        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn search(&self, index: &str, query: &Value) -> Result<SearchHits, StoreError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status_code().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;
        Ok(Self::parse_search_response(&body))
    }
}
