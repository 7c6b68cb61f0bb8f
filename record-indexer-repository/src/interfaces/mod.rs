//! Interface definitions for the document store.
//!
//! This module defines the abstract `DocumentStore` trait that allows the
//! pipeline to receive its store by injection and tests to swap in mocks.

mod document_store;

pub use document_store::DocumentStore;
