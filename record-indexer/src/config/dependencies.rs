//! Dependency initialization and wiring for the record indexer.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Settings;
use crate::IndexerError;
use record_indexer_repository::{DocumentStore, OpenSearchStore, StoreInfo};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The document store, shared by every uploader.
    pub store: Arc<dyn DocumentStore>,
    /// Cluster information reported at startup.
    pub info: StoreInfo,
}

impl Dependencies {
    /// Connect to the document store and verify it answers.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexerError)` - If the client can't be built or the info call fails
    pub async fn new(
        settings: &Settings,
        request_timeout: Option<Duration>,
    ) -> Result<Self, IndexerError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            client_version = OpenSearchStore::client_version(),
            "Initializing dependencies"
        );

        let store = OpenSearchStore::new(&settings.opensearch_url, request_timeout)
            .map_err(|e| IndexerError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        Self::with_store(Arc::new(store)).await
    }

    /// Wrap an existing store, running the same startup check.
    pub async fn with_store(store: Arc<dyn DocumentStore>) -> Result<Self, IndexerError> {
        let info = store
            .info()
            .await
            .map_err(|e| IndexerError::startup(format!("Could not get cluster info: {}", e)))?;

        info!(
            server_version = %info.version,
            cluster = %info.cluster_name,
            "Connected to document store"
        );

        Ok(Self { store, info })
    }
}
