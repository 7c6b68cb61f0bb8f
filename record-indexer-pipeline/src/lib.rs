//! # Record Indexer Pipeline
//!
//! This crate provides the batched concurrent ingestion pipeline that loads
//! parsed records into the document store.
//!
//! ## Architecture
//!
//! 1. **Source**: Reads CSV rows (from disk or an object store) into typed records
//! 2. **Batcher**: Splits the records into fixed-size, sequentially numbered batches
//! 3. **Dispatch**: Hands batches to the uploader pool through a shared queue
//! 4. **Worker**: A fixed pool of uploaders, one bulk request per batch
//! 5. **Orchestrator**: Waits for one completion report per batch, then shuts the pool down

pub mod batcher;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod orchestrator;
pub mod source;
pub mod worker;

#[cfg(test)]
mod testing;

pub use batcher::{Batch, Batcher};
pub use config::{IndexMode, PipelineConfig};
pub use dispatch::QueueCapacity;
pub use errors::PipelineError;
pub use orchestrator::{Orchestrator, RunSummary};
pub use worker::{BatchOutcome, BatchReport};
