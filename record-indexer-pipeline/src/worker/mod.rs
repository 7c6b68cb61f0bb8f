//! Worker module for the record indexer pipeline.
//!
//! A fixed pool of uploaders. Each uploader pulls one batch at a time from the
//! dispatch queue, writes it to the store and reports exactly one
//! [`BatchReport`] per batch, whatever the outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use record_indexer_repository::{BulkBody, DocumentStore, StoreError};
use record_indexer_shared::Document;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::batcher::Batch;
use crate::config::{IndexMode, PipelineConfig};
use crate::dispatch::DispatchReceiver;
use crate::errors::PipelineError;

/// Initial bulk body allocation per uploader.
const BODY_CAPACITY: usize = 64 * 1024;

/// Settings shared by every uploader in a pool.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub index: String,
    pub mode: IndexMode,
    pub request_timeout: Option<Duration>,
}

impl From<&PipelineConfig> for WorkerSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            index: config.index.clone(),
            mode: config.mode,
            request_timeout: config.request_timeout,
        }
    }
}

/// Terminal state of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every document sent was accepted.
    Indexed,
    /// The request went through but some documents were rejected.
    PartiallyIndexed { failed: usize },
    /// The request never got an answer (connection failure or timeout).
    TransportFailed { error: String },
    /// The store rejected the whole request.
    Rejected {
        status: u16,
        kind: String,
        reason: String,
    },
    /// Nothing was left to send after serialization.
    Skipped,
}

impl BatchOutcome {
    fn from_error(err: StoreError) -> Self {
        match err {
            StoreError::Rejected {
                status,
                kind,
                reason,
            } => Self::Rejected {
                status,
                kind,
                reason,
            },
            other => Self::TransportFailed {
                error: other.to_string(),
            },
        }
    }
}

/// Completion report an uploader sends for every batch it takes.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub batch_id: u64,
    pub worker: usize,
    /// Records in the batch.
    pub records: usize,
    /// Documents that made it into a request.
    pub sent: usize,
    /// Sent documents the store did not accept.
    pub failed: usize,
    /// Records dropped because they could not be serialized.
    pub serialization_failures: usize,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    /// Documents the store accepted.
    pub fn indexed(&self) -> usize {
        self.sent.saturating_sub(self.failed)
    }

    /// Whether anything in the batch went wrong.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.serialization_failures > 0
    }
}

/// Run a store call, bounded by `timeout` when set.
async fn with_timeout<T, F>(timeout: Option<Duration>, request: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .unwrap_or_else(|_| Err(StoreError::Timeout(limit))),
        None => request.await,
    }
}

/// A single uploader.
///
/// Owns its bulk body for its whole lifetime; the body is cleared after each
/// batch and never shared.
pub struct Uploader {
    id: usize,
    store: Arc<dyn DocumentStore>,
    settings: Arc<WorkerSettings>,
    body: BulkBody,
}

impl Uploader {
    pub fn new(id: usize, store: Arc<dyn DocumentStore>, settings: Arc<WorkerSettings>) -> Self {
        Self {
            id,
            store,
            settings,
            body: BulkBody::with_capacity(BODY_CAPACITY),
        }
    }

    /// Pull batches until shutdown or until the queue is closed and drained.
    pub async fn run<D: Document>(
        mut self,
        queue: DispatchReceiver<Batch<D>>,
        completions: mpsc::UnboundedSender<BatchReport>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        debug!(worker = self.id, "Uploader started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    debug!(worker = self.id, "Uploader received shutdown signal");
                    break;
                }
                batch = queue.recv() => {
                    let Some(batch) = batch else {
                        debug!(worker = self.id, "Dispatch queue closed");
                        break;
                    };

                    let report = self.process(batch).await;
                    if completions.send(report).is_err() {
                        warn!(worker = self.id, "Completion channel closed, stopping uploader");
                        break;
                    }
                }
            }
        }

        debug!(worker = self.id, "Uploader stopped");
    }

    /// Write one batch and classify the result.
    pub async fn process<D: Document>(&mut self, batch: Batch<D>) -> BatchReport {
        let report = match self.settings.mode {
            IndexMode::Bulk => self.upload_bulk(&batch).await,
            IndexMode::Single => self.upload_single(&batch).await,
        };

        match &report.outcome {
            BatchOutcome::Indexed => debug!(
                worker = self.id,
                batch_id = report.batch_id,
                documents = report.sent,
                "Batch indexed"
            ),
            BatchOutcome::PartiallyIndexed { failed } => warn!(
                worker = self.id,
                batch_id = report.batch_id,
                failed = failed,
                indexed = report.indexed(),
                "Batch partially indexed"
            ),
            BatchOutcome::TransportFailed { error } => error!(
                worker = self.id,
                batch_id = report.batch_id,
                error = %error,
                "Batch upload failed"
            ),
            BatchOutcome::Rejected {
                status,
                kind,
                reason,
            } => error!(
                worker = self.id,
                batch_id = report.batch_id,
                status = status,
                kind = %kind,
                reason = %reason,
                "Batch rejected by store"
            ),
            BatchOutcome::Skipped => warn!(
                worker = self.id,
                batch_id = report.batch_id,
                "Batch had no serializable records"
            ),
        }

        report
    }

    async fn upload_bulk<D: Document>(&mut self, batch: &Batch<D>) -> BatchReport {
        self.body.clear();

        let mut serialization_failures = 0;
        for record in &batch.records {
            if let Err(e) = self.body.push(record) {
                serialization_failures += 1;
                warn!(
                    worker = self.id,
                    batch_id = batch.id,
                    doc_id = record.id(),
                    error = %e,
                    "Skipping record that failed to serialize"
                );
            }
        }

        let sent = self.body.len();
        let (outcome, failed) = if self.body.is_empty() {
            (BatchOutcome::Skipped, 0)
        } else {
            let request = self
                .store
                .bulk(&self.settings.index, self.body.as_bytes());

            match with_timeout(self.settings.request_timeout, request).await {
                Ok(result) if !result.has_failures() => (BatchOutcome::Indexed, 0),
                Ok(result) => {
                    for failure in &result.failures {
                        warn!(
                            worker = self.id,
                            batch_id = batch.id,
                            doc_id = %failure.id,
                            status = failure.status,
                            kind = %failure.kind,
                            reason = %failure.reason,
                            "Document rejected"
                        );
                    }
                    let failed = result.failures.len();
                    (BatchOutcome::PartiallyIndexed { failed }, failed)
                }
                Err(e) => (BatchOutcome::from_error(e), sent),
            }
        };

        self.body.clear();

        BatchReport {
            batch_id: batch.id,
            worker: self.id,
            records: batch.len(),
            sent,
            failed,
            serialization_failures,
            outcome,
        }
    }

    async fn upload_single<D: Document>(&mut self, batch: &Batch<D>) -> BatchReport {
        let mut serialization_failures = 0;
        let mut sent = 0;
        let mut failed = 0;
        let mut last_error = None;

        for record in &batch.records {
            let document = match serde_json::to_value(record) {
                Ok(document) => document,
                Err(e) => {
                    serialization_failures += 1;
                    warn!(
                        worker = self.id,
                        batch_id = batch.id,
                        doc_id = record.id(),
                        error = %e,
                        "Skipping record that failed to serialize"
                    );
                    continue;
                }
            };

            sent += 1;
            let id = record.id().to_string();
            let request = self
                .store
                .index_document(&self.settings.index, &id, &document);

            if let Err(e) = with_timeout(self.settings.request_timeout, request).await {
                warn!(
                    worker = self.id,
                    batch_id = batch.id,
                    doc_id = %id,
                    error = %e,
                    "Document upload failed"
                );
                failed += 1;
                last_error = Some(e);
            }
        }

        let outcome = match last_error {
            _ if sent == 0 => BatchOutcome::Skipped,
            None => BatchOutcome::Indexed,
            Some(e) if failed == sent => BatchOutcome::from_error(e),
            Some(_) => BatchOutcome::PartiallyIndexed { failed },
        };

        BatchReport {
            batch_id: batch.id,
            worker: self.id,
            records: batch.len(),
            sent,
            failed,
            serialization_failures,
            outcome,
        }
    }
}

/// A fixed pool of uploaders spawned once per run.
pub struct WorkerPool {
    handles: FuturesUnordered<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` uploaders sharing `queue`.
    ///
    /// Every uploader subscribes to `shutdown` before this returns, so a
    /// shutdown sent afterwards reaches all of them.
    pub fn new<D: Document>(
        size: usize,
        store: Arc<dyn DocumentStore>,
        settings: WorkerSettings,
        queue: DispatchReceiver<Batch<D>>,
        completions: mpsc::UnboundedSender<BatchReport>,
        shutdown: &broadcast::Sender<()>,
    ) -> Self {
        let settings = Arc::new(settings);

        let handles = (1..=size)
            .map(|id| {
                let uploader = Uploader::new(id, Arc::clone(&store), Arc::clone(&settings));
                tokio::spawn(uploader.run(queue.clone(), completions.clone(), shutdown.subscribe()))
            })
            .collect();

        info!(workers = size, mode = %settings.mode, "Spawned uploader pool");
        Self { handles }
    }

    /// Whether every uploader has stopped.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for the next uploader to stop.
    ///
    /// Returns `None` when none is left, and a worker error when the
    /// uploader panicked.
    pub async fn next_exit(&mut self) -> Option<Result<(), PipelineError>> {
        let result = self.handles.next().await?;
        Some(result.map_err(|e| {
            error!(error = %e, "Uploader task failed");
            PipelineError::worker(format!("uploader task failed: {}", e))
        }))
    }

    /// Wait for every remaining uploader to stop.
    pub async fn join(mut self) -> Result<(), PipelineError> {
        let mut failed = 0;
        while let Some(result) = self.next_exit().await {
            if result.is_err() {
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(PipelineError::worker(format!(
                "{} uploader task(s) failed",
                failed
            )));
        }
        Ok(())
    }
}
