//! # Record Indexer Repository
//!
//! This crate provides the document store abstraction used by the ingest
//! pipeline and a concrete implementation for OpenSearch (compatible with
//! Elasticsearch 7 clusters). It also owns the bulk wire format: encoding
//! action/document line pairs and decoding bulk responses.

pub mod bulk;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use bulk::BulkBody;
pub use errors::StoreError;
pub use interfaces::DocumentStore;
pub use opensearch::OpenSearchStore;
pub use types::{BulkOutcome, ItemFailure, SearchHit, SearchHits, StoreInfo};
