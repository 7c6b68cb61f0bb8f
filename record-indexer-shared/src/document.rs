//! The document abstraction the pipeline batches and uploads.

use serde::Serialize;

/// A record that can be written to the document store.
///
/// The identity is assigned once when the record is read and is used as the
/// `_id` of the indexed document, so re-indexing the same record overwrites
/// the previous version instead of creating a duplicate.
pub trait Document: Serialize + Send + Sync + 'static {
    /// The record's 1-based identity.
    fn id(&self) -> u64;
}
