//! Configuration for an ingest run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::dispatch::QueueCapacity;
use crate::errors::PipelineError;

/// How uploaders write a batch to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// One bulk request per batch.
    #[default]
    Bulk,
    /// One index request per document, refreshed immediately.
    Single,
}

impl FromStr for IndexMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bulk" => Ok(Self::Bulk),
            "single" => Ok(Self::Single),
            other => Err(PipelineError::config(format!(
                "unknown index mode '{}', expected 'bulk' or 'single'",
                other
            ))),
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk => f.write_str("bulk"),
            Self::Single => f.write_str("single"),
        }
    }
}

/// Configuration for the orchestrator and its uploader pool.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Index the documents are written to.
    pub index: String,
    /// Number of concurrent uploaders.
    pub num_workers: usize,
    /// Maximum number of records per batch.
    pub batch_size: usize,
    /// Capacity of the queue between the batcher and the uploaders.
    pub queue_capacity: QueueCapacity,
    /// Bulk or per-document writes.
    pub mode: IndexMode,
    /// Upper bound on a single store request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("records", 4, 1000)
    }
}

impl PipelineConfig {
    /// Create a config with a bounded queue twice the size of the pool.
    pub fn new(index: impl Into<String>, num_workers: usize, batch_size: usize) -> Self {
        Self {
            index: index.into(),
            num_workers,
            batch_size,
            queue_capacity: QueueCapacity::Bounded(num_workers.max(1) * 2),
            mode: IndexMode::Bulk,
            request_timeout: Some(Duration::from_secs(60)),
        }
    }

    pub fn with_queue_capacity(mut self, queue_capacity: QueueCapacity) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_mode(mut self, mode: IndexMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Reject configurations that can't make progress.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.index.trim().is_empty() {
            return Err(PipelineError::config("index name is required"));
        }
        if self.num_workers == 0 {
            return Err(PipelineError::config("number of workers must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::config("batch size must be at least 1"));
        }
        if self.queue_capacity == QueueCapacity::Bounded(0) {
            return Err(PipelineError::config(
                "bounded queue capacity must be at least 1",
            ));
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(PipelineError::config("request timeout must be positive"));
        }
        Ok(())
    }
}
