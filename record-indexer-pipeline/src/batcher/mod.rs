//! Batcher module for the record indexer pipeline.
//!
//! Splits an ordered record sequence into fixed-size batches.

use crate::errors::PipelineError;

/// An ordered group of records and its sequence number.
///
/// Batch ids start at 1 and follow production order. A batch is moved into
/// exactly one uploader and never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<D> {
    pub id: u64,
    pub records: Vec<D>,
}

impl<D> Batch<D> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Number of batches `records` records split into.
pub fn batch_count(records: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    records.div_ceil(batch_size)
}

/// Iterator producing batches from an owned record sequence.
///
/// Batch `i` (0-indexed) holds records `[i * batch_size, min((i + 1) * batch_size, n))`;
/// only the last batch may be short.
pub struct Batcher<D> {
    records: std::vec::IntoIter<D>,
    batch_size: usize,
    next_id: u64,
}

impl<D> Batcher<D> {
    /// Create a batcher over `records`.
    ///
    /// # Returns
    ///
    /// * `Err(PipelineError::ConfigError)` - If `batch_size` is zero
    pub fn new(records: Vec<D>, batch_size: usize) -> Result<Self, PipelineError> {
        if batch_size == 0 {
            return Err(PipelineError::config("batch size must be at least 1"));
        }
        Ok(Self {
            records: records.into_iter(),
            batch_size,
            next_id: 1,
        })
    }

    /// Number of batches still to be produced.
    pub fn remaining(&self) -> usize {
        batch_count(self.records.len(), self.batch_size)
    }
}

impl<D> Iterator for Batcher<D> {
    type Item = Batch<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let records: Vec<D> = self.records.by_ref().take(self.batch_size).collect();
        if records.is_empty() {
            return None;
        }

        let batch = Batch {
            id: self.next_id,
            records,
        };
        self.next_id += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<D> ExactSizeIterator for Batcher<D> {}
