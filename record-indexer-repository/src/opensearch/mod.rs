//! OpenSearch implementation of the document store.
//!
//! This module provides a concrete implementation of `DocumentStore` using
//! the OpenSearch Rust client, along with index mappings and query builders.

mod client;
pub mod index_config;
pub mod queries;

pub use client::OpenSearchStore;
