//! Error types for the record indexer pipeline.

use record_indexer_repository::StoreError;
use thiserror::Error;

/// Errors that can occur in the record indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reading the record source.
    #[error("Source error: {0}")]
    SourceError(String),

    /// Error from the document store.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Error from the object store holding the input.
    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// An uploader task failed.
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The run was interrupted before every batch completed.
    #[error("Pipeline cancelled after {completed} of {expected} batches")]
    Cancelled { completed: usize, expected: usize },
}

impl PipelineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a source read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::SourceError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::WorkerError(msg.into())
    }
}
