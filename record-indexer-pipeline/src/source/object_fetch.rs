//! Byte-range downloads of CSV objects from object storage.

use std::path::Path;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::{info, instrument};

use crate::errors::PipelineError;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "ca-central-1";

/// Leading bytes of an object.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPrefix {
    pub data: Vec<u8>,
    /// Whether the object continues past `data`.
    pub truncated: bool,
}

/// Fetches object prefixes from any `object_store` backend.
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ObjectFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Build a fetcher for an S3 bucket.
    ///
    /// Credentials come from the standard `AWS_*` environment variables.
    pub fn s3(bucket: &str, region: &str) -> Result<Self, PipelineError> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()?;

        info!(bucket = %bucket, region = %region, "Created S3 object store");
        Ok(Self::new(Arc::new(store)))
    }

    /// Download bytes `0..=kib * 1024` of `key`, clamped to the object size.
    #[instrument(skip(self))]
    pub async fn fetch_prefix(&self, key: &str, kib: u64) -> Result<FetchedPrefix, PipelineError> {
        let path = ObjectPath::from(key);
        let size = self.store.head(&path).await?.size;

        if size == 0 {
            return Ok(FetchedPrefix {
                data: Vec::new(),
                truncated: false,
            });
        }

        let end = kib.saturating_mul(1024).saturating_add(1).min(size);
        let data = self.store.get_range(&path, 0..end).await?;

        info!(key = %key, bytes = data.len(), size = size, "Fetched object prefix");
        Ok(FetchedPrefix {
            data: data.to_vec(),
            truncated: end < size,
        })
    }

    /// Save the prefix of `key` to `dest` and return the number of bytes written.
    pub async fn download_to_file(
        &self,
        key: &str,
        kib: u64,
        dest: impl AsRef<Path>,
    ) -> Result<u64, PipelineError> {
        let dest = dest.as_ref();
        let prefix = self.fetch_prefix(key, kib).await?;
        tokio::fs::write(dest, &prefix.data).await?;

        let written = prefix.data.len() as u64;
        info!(key = %key, path = %dest.display(), bytes = written, "Downloaded object prefix");
        Ok(written)
    }
}
