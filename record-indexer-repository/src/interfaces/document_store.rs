//! Document store trait definition.
//!
//! This module defines the abstract interface for the remote indexing
//! service, allowing different backend implementations (OpenSearch,
//! Elasticsearch, in-memory mocks).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;
use crate::types::{BulkOutcome, SearchHits, StoreInfo};

/// Abstract interface for document store operations.
///
/// One instance is built at startup and shared by every uploader worker, so
/// implementations must be safe for concurrent use.
///
/// # Error Handling
///
/// Methods return `Err` for transport failures and for responses with a
/// non-success status. A bulk request that the store accepted returns `Ok`
/// even when individual documents were rejected; those are listed in the
/// returned [`BulkOutcome`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch cluster information, used as a connectivity check at startup.
    async fn info(&self) -> Result<StoreInfo, StoreError>;

    /// Create `index` with the given settings and mappings if it does not
    /// exist yet.
    async fn ensure_index(&self, index: &str, settings: &Value) -> Result<(), StoreError>;

    /// Send a pre-encoded bulk body to `index`.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index for actions that don't name one
    /// * `body` - Newline-delimited action/document pairs, see [`crate::BulkBody`]
    ///
    /// # Returns
    ///
    /// * `Ok(BulkOutcome)` - The store accepted the request; per-item failures are listed
    /// * `Err(StoreError)` - The request failed as a whole
    async fn bulk(&self, index: &str, body: &[u8]) -> Result<BulkOutcome, StoreError>;

    /// Index a single document under `id`, replacing any existing version.
    ///
    /// The write is refreshed immediately so it is visible to searches.
    async fn index_document(&self, index: &str, id: &str, document: &Value)
        -> Result<(), StoreError>;

    /// Run a search request body against `index`.
    async fn search(&self, index: &str, query: &Value) -> Result<SearchHits, StoreError>;
}
