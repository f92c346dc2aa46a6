//! Document store capability
//!
//! Resolves `scheme://bucket/path` references to raw bytes through
//! `object_store` backends.

use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use shared_types::DocumentReference;
use std::path::PathBuf;
use std::sync::Arc;

/// Fetches raw document bytes for a reference
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError>;
}

/// Storage backend settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for `file://bucket/path` references
    pub local_root: PathBuf,
    /// Service account key for Google Cloud Storage. Falls back to
    /// application default credentials when unset.
    pub gcs_service_account_path: Option<String>,
    /// Region for `s3://` references
    pub s3_region: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            local_root: PathBuf::from("."),
            gcs_service_account_path: None,
            s3_region: None,
        }
    }
}

/// Store that builds the matching `object_store` backend for each reference
pub struct ObjectStoreSource {
    config: StoreConfig,
}

impl ObjectStoreSource {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Build the backend serving `bucket` under `scheme` (gs, s3 or file).
    /// Also used to write reports to a results bucket.
    pub fn backend(&self, scheme: &str, bucket: &str) -> Result<Arc<dyn ObjectStore>, StoreError> {
        match scheme {
            "gs" => {
                let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket);
                if let Some(path) = &self.config.gcs_service_account_path {
                    builder = builder.with_service_account_path(path);
                }
                Ok(Arc::new(builder.build()?))
            }

            "s3" => {
                let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
                if let Some(region) = &self.config.s3_region {
                    builder = builder.with_region(region);
                }
                Ok(Arc::new(builder.build()?))
            }

            "file" => {
                let root = self.config.local_root.join(bucket);
                Ok(Arc::new(LocalFileSystem::new_with_prefix(root)?))
            }

            other => Err(StoreError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for ObjectStoreSource {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError> {
        let backend = self.backend(reference.scheme(), reference.bucket())?;
        get_bytes(backend.as_ref(), reference.path()).await
    }
}

/// A single bucket bound to a pre-built backend (in-memory stores, local dev)
pub struct BucketStore {
    bucket: String,
    backend: Arc<dyn ObjectStore>,
}

impl BucketStore {
    pub fn new(bucket: impl Into<String>, backend: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            backend,
        }
    }
}

#[async_trait]
impl DocumentStore for BucketStore {
    async fn fetch(&self, reference: &DocumentReference) -> Result<Bytes, StoreError> {
        if reference.bucket() != self.bucket {
            return Err(StoreError::UnknownBucket(reference.bucket().to_string()));
        }
        get_bytes(self.backend.as_ref(), reference.path()).await
    }
}

async fn get_bytes(backend: &dyn ObjectStore, path: &str) -> Result<Bytes, StoreError> {
    let location =
        ObjectPath::parse(path).map_err(|_| StoreError::InvalidPath(path.to_string()))?;
    let result = backend.get(&location).await?;
    Ok(result.bytes().await?)
}
