//! Orchestrator module for the record indexer pipeline.
//!
//! Drives one ingest run: batches the records, feeds them to the uploader
//! pool and waits for exactly one completion report per batch.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use record_indexer_repository::DocumentStore;
use record_indexer_shared::Document;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument, warn};

use crate::batcher::Batcher;
use crate::config::PipelineConfig;
use crate::dispatch::dispatch_queue;
use crate::errors::PipelineError;
use crate::worker::{BatchOutcome, BatchReport, WorkerPool, WorkerSettings};

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Number of batches dispatched.
    pub batches: usize,
    /// Number of records handed to the pipeline.
    pub records: usize,
    /// Documents included in a store request.
    pub documents_sent: usize,
    /// Sent documents the store did not accept.
    pub documents_failed: usize,
    /// Records dropped before sending.
    pub serialization_failures: usize,
    /// Ids of batches that did not index cleanly, ascending.
    pub failed_batches: Vec<u64>,
    /// Ids of batches in the order their reports arrived.
    pub completed_batches: Vec<u64>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(batches: usize, records: usize) -> Self {
        Self {
            batches,
            records,
            ..Default::default()
        }
    }

    /// Fold one batch report into the totals.
    pub fn record(&mut self, report: &BatchReport) {
        self.completed_batches.push(report.batch_id);
        self.documents_sent += report.sent;
        self.documents_failed += report.failed;
        self.serialization_failures += report.serialization_failures;

        if report.outcome != BatchOutcome::Indexed || report.has_failures() {
            self.failed_batches.push(report.batch_id);
        }
    }

    /// Documents the store accepted.
    pub fn documents_indexed(&self) -> usize {
        self.documents_sent.saturating_sub(self.documents_failed)
    }

    /// Whether every record was indexed.
    pub fn is_clean(&self) -> bool {
        self.failed_batches.is_empty()
    }
}

/// Resolves on ctrl-c. Never resolves when the signal can't be observed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Validates the configuration before any record is read
/// - Spawns the producer and the uploader pool for each run
/// - Counts completion reports against the expected batch count
/// - Broadcasts shutdown and joins every task when the run ends
///
/// Each run owns its pool and shutdown channel, so concurrent runs on the
/// same orchestrator don't interfere.
pub struct Orchestrator {
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create a new orchestrator writing to `store`.
    ///
    /// # Returns
    ///
    /// * `Err(PipelineError::ConfigError)` - If the configuration is invalid
    pub fn new(store: Arc<dyn DocumentStore>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Create the target index with `settings` if it does not exist yet.
    pub async fn ensure_index(&self, settings: &Value) -> Result<(), PipelineError> {
        self.store
            .ensure_index(&self.config.index, settings)
            .await
            .map_err(PipelineError::from)
    }

    /// Index `records`, stopping early on ctrl-c.
    pub async fn run<D: Document>(&self, records: Vec<D>) -> Result<RunSummary, PipelineError> {
        self.run_until(records, interrupted()).await
    }

    /// Index `records` and wait until every batch has reached a terminal state.
    ///
    /// Batch failures are reported in the summary and never abort the run.
    /// Returns [`PipelineError::Cancelled`] when `cancel` resolves before
    /// every batch reported back, and a worker error when an uploader dies.
    #[instrument(skip(self, records, cancel), fields(index = %self.config.index, records = records.len()))]
    pub async fn run_until<D, F>(&self, records: Vec<D>, cancel: F) -> Result<RunSummary, PipelineError>
    where
        D: Document,
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let record_count = records.len();

        let batcher = Batcher::new(records, self.config.batch_size)?;
        let expected = batcher.len();
        let mut summary = RunSummary::new(expected, record_count);

        if expected == 0 {
            info!("No records to index");
            summary.elapsed = started.elapsed();
            return Ok(summary);
        }

        info!(
            batches = expected,
            batch_size = self.config.batch_size,
            workers = self.config.num_workers,
            "Starting ingest run"
        );

        let (shutdown_tx, _) = broadcast::channel(1);
        let (queue_tx, queue_rx) = dispatch_queue(self.config.queue_capacity);
        let (completions_tx, mut completions_rx) = mpsc::unbounded_channel::<BatchReport>();

        let mut pool = WorkerPool::new(
            self.config.num_workers,
            Arc::clone(&self.store),
            WorkerSettings::from(&self.config),
            queue_rx,
            completions_tx,
            &shutdown_tx,
        );

        let producer = tokio::spawn(async move {
            for batch in batcher {
                let batch_id = batch.id;
                if let Err(e) = queue_tx.send(batch).await {
                    debug!(batch_id = batch_id, error = %e, "Stopped dispatching");
                    return Err(e);
                }
            }
            Ok(())
        });

        tokio::pin!(cancel);
        let mut completed = 0;
        let result = loop {
            if completed == expected {
                break Ok(());
            }

            tokio::select! {
                biased;

                // A panicked uploader never reports its batch.
                Some(Err(e)) = pool.next_exit(), if !pool.is_empty() => {
                    break Err(e);
                }
                report = completions_rx.recv() => {
                    match report {
                        Some(report) => {
                            summary.record(&report);
                            completed += 1;
                        }
                        None => {
                            error!(completed = completed, expected = expected, "Uploader pool stopped early");
                            break Err(PipelineError::Cancelled { completed, expected });
                        }
                    }
                }
                _ = &mut cancel => {
                    warn!(completed = completed, expected = expected, "Run cancelled");
                    break Err(PipelineError::Cancelled { completed, expected });
                }
            }
        };

        // Idle uploaders are parked on the queue; wake them up.
        let _ = shutdown_tx.send(());
        drop(completions_rx);

        match producer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if result.is_ok() => return Err(e),
            Ok(Err(_)) => {}
            Err(e) => return Err(PipelineError::worker(format!("producer task failed: {}", e))),
        }
        pool.join().await?;
        result?;

        summary.failed_batches.sort_unstable();
        summary.elapsed = started.elapsed();

        info!(
            workers = self.config.num_workers,
            batches = summary.batches,
            indexed = summary.documents_indexed(),
            failed = summary.documents_failed,
            serialization_failures = summary.serialization_failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Num uploaders: {} {:?}",
            self.config.num_workers,
            summary.elapsed
        );

        Ok(summary)
    }
}
