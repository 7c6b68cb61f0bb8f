//! Request and response types for document store operations.

use serde_json::Value;

/// Cluster information reported by the store's root endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreInfo {
    /// Name of the cluster.
    pub cluster_name: String,
    /// Server version number (e.g. `2.11.0` or `7.10.2`).
    pub version: String,
    /// Distribution name when the server reports one (`opensearch`).
    pub distribution: Option<String>,
}

/// A document that failed inside an otherwise successful bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// The document id the failure refers to.
    pub id: String,
    /// Per-item HTTP status.
    pub status: u16,
    /// Store error type (e.g. `mapper_parsing_exception`).
    pub kind: String,
    /// Human readable reason.
    pub reason: String,
}

/// Decoded result of a bulk request the store accepted.
///
/// A bulk request can succeed at the HTTP level while individual documents
/// are rejected. `failures` lists those documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    /// Server-side processing time in milliseconds.
    pub took_ms: u64,
    /// Number of items the store reported on.
    pub items: usize,
    /// Items the store rejected.
    pub failures: Vec<ItemFailure>,
}

impl BulkOutcome {
    /// Number of documents the store accepted.
    pub fn succeeded(&self) -> usize {
        self.items.saturating_sub(self.failures.len())
    }

    /// Whether any document in the request failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The document id.
    pub id: String,
    /// The stored document.
    pub source: Value,
}

/// Results of a search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Total number of matching documents.
    pub total: u64,
    /// Server-side processing time in milliseconds.
    pub took_ms: u64,
    /// The returned page of hits.
    pub hits: Vec<SearchHit>,
}
