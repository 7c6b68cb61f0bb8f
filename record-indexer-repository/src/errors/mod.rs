//! Error types for the record indexer repository.

mod store_error;

pub use store_error::StoreError;
