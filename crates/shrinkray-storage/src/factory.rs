#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use shrinkray_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config
                .s3_region()
                .or_else(|| config.aws_region())
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            tracing::info!(region = %region, endpoint = ?endpoint, "Using S3 storage backend");
            Ok(Arc::new(S3Storage::new(region, endpoint)))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            tracing::info!(path = %base_path, "Using local storage backend");
            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use shrinkray_core::PipelineConfig;

    #[tokio::test]
    async fn builds_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = PipelineConfig::with_buckets("raw", "processed");
        pipeline.local_storage_path = Some(dir.path().display().to_string());
        pipeline.local_storage_base_url = Some("http://localhost:3000/files".to_string());

        let storage = create_storage(&Config::from(pipeline)).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn local_backend_requires_path() {
        let config = Config::from(PipelineConfig::with_buckets("raw", "processed"));
        assert!(matches!(
            create_storage(&config).await,
            Err(StorageError::ConfigError(_))
        ));
    }

    #[cfg(feature = "storage-s3")]
    #[tokio::test]
    async fn s3_backend_requires_region() {
        let mut pipeline = PipelineConfig::with_buckets("raw", "processed");
        pipeline.storage_backend = StorageBackend::S3;
        assert!(create_storage(&Config::from(pipeline.clone())).await.is_err());

        pipeline.aws_region = Some("us-east-1".to_string());
        let storage = create_storage(&Config::from(pipeline)).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }
}
