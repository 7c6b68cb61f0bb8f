//! Test doubles shared by the pipeline test modules.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use record_indexer_repository::{
    BulkOutcome, DocumentStore, ItemFailure, SearchHits, StoreError, StoreInfo,
};
use record_indexer_shared::Document;
use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::sync::Mutex;

/// A record whose serialization can be made to fail.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub id: u64,
    pub broken: bool,
}

impl Serialize for TestRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.broken {
            return Err(S::Error::custom("value is not representable"));
        }
        let mut state = serializer.serialize_struct("TestRecord", 1)?;
        state.serialize_field("value", &format!("record-{}", self.id))?;
        state.end()
    }
}

impl Document for TestRecord {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Records with ids `1..=n`.
pub fn records(n: u64) -> Vec<TestRecord> {
    (1..=n).map(|id| TestRecord { id, broken: false }).collect()
}

/// In-memory document store counting writes per document id.
#[derive(Default)]
pub struct MockStore {
    writes: Mutex<HashMap<String, usize>>,
    pub bulk_calls: AtomicUsize,
    pub index_calls: AtomicUsize,
    pub ensure_calls: AtomicUsize,
    /// A request containing any of these ids fails at the transport level.
    transport_failures: HashSet<String>,
    /// A request containing any of these ids is rejected with a 400.
    rejections: HashSet<String>,
    /// These ids are reported as failed items in an accepted bulk response.
    item_failures: HashSet<String>,
    /// A bulk request containing any of these ids panics.
    panics: HashSet<String>,
    delay: Option<Duration>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_transport_on(mut self, id: u64) -> Self {
        self.transport_failures.insert(id.to_string());
        self
    }

    pub fn reject_on(mut self, id: u64) -> Self {
        self.rejections.insert(id.to_string());
        self
    }

    pub fn fail_item(mut self, id: u64) -> Self {
        self.item_failures.insert(id.to_string());
        self
    }

    pub fn panic_on(mut self, id: u64) -> Self {
        self.panics.insert(id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of distinct document ids written.
    pub async fn distinct_writes(&self) -> usize {
        self.writes.lock().await.len()
    }

    /// Total number of document writes, counting overwrites.
    pub async fn total_writes(&self) -> usize {
        self.writes.lock().await.values().sum()
    }

    pub async fn writes_for(&self, id: u64) -> usize {
        self.writes
            .lock()
            .await
            .get(&id.to_string())
            .copied()
            .unwrap_or(0)
    }

    fn check_request(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.iter().any(|id| self.transport_failures.contains(id)) {
            return Err(StoreError::transport("connection reset by peer"));
        }
        if ids.iter().any(|id| self.rejections.contains(id)) {
            return Err(StoreError::rejected(
                400,
                "illegal_argument_exception",
                "request rejected",
            ));
        }
        Ok(())
    }
}

/// Extract the `_id` of every action line in a bulk body.
pub fn bulk_ids(body: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    text.lines()
        .step_by(2)
        .filter_map(|line| {
            let action: Value = serde_json::from_str(line).ok()?;
            Some(action["index"]["_id"].as_str()?.to_string())
        })
        .collect()
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn info(&self) -> Result<StoreInfo, StoreError> {
        Ok(StoreInfo {
            cluster_name: "mock".to_string(),
            version: "2.11.0".to_string(),
            distribution: Some("opensearch".to_string()),
        })
    }

    async fn ensure_index(&self, _index: &str, _settings: &Value) -> Result<(), StoreError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn bulk(&self, _index: &str, body: &[u8]) -> Result<BulkOutcome, StoreError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let ids = bulk_ids(body);
        if ids.iter().any(|id| self.panics.contains(id)) {
            panic!("store crashed while indexing");
        }
        self.check_request(&ids)?;

        let mut failures = Vec::new();
        let mut writes = self.writes.lock().await;
        for id in &ids {
            if self.item_failures.contains(id) {
                failures.push(ItemFailure {
                    id: id.clone(),
                    status: 400,
                    kind: "mapper_parsing_exception".to_string(),
                    reason: "failed to parse".to_string(),
                });
            } else {
                *writes.entry(id.clone()).or_insert(0) += 1;
            }
        }

        Ok(BulkOutcome {
            took_ms: 1,
            items: ids.len(),
            failures,
        })
    }

    async fn index_document(
        &self,
        _index: &str,
        id: &str,
        _document: &Value,
    ) -> Result<(), StoreError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.check_request(&[id.to_string()])?;
        *self.writes.lock().await.entry(id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn search(&self, _index: &str, _query: &Value) -> Result<SearchHits, StoreError> {
        Ok(SearchHits {
            total: 0,
            took_ms: 0,
            hits: Vec::new(),
        })
    }
}
