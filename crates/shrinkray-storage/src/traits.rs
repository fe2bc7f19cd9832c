//! Storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn not_found(bucket: &str, key: &str) -> Self {
        StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Implemented by the S3 backend and the local filesystem backend. Handles are
/// built once per process and shared as `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the full content of an object.
    ///
    /// Returns `StorageError::NotFound` when the object does not exist.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Store an object, replacing any existing object under the same key.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;

    /// Generate a time-bounded GET URL for an object.
    ///
    /// A new URL is produced on every call.
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
