use crate::keys::{validate_bucket, validate_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// S3 storage implementation
///
/// An `AmazonS3` store is bound to a single bucket, so one is built per bucket
/// on first use and kept for the lifetime of the process.
pub struct S3Storage {
    stores: RwLock<HashMap<String, AmazonS3>>,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:4566" for LocalStack)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            stores: RwLock::new(HashMap::new()),
            region,
            endpoint_url,
        }
    }

    fn build_store(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http)
                .with_virtual_hosted_style_request(false);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store_for(&self, bucket: &str) -> StorageResult<AmazonS3> {
        validate_bucket(bucket)?;

        {
            let stores = self
                .stores
                .read()
                .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?;
            if let Some(store) = stores.get(bucket) {
                return Ok(store.clone());
            }
        }

        let store = self.build_store(bucket)?;
        let mut stores = self
            .stores
            .write()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?;

        tracing::debug!(bucket = %bucket, region = %self.region, "S3 client created");
        Ok(stores.entry(bucket.to_string()).or_insert(store).clone())
    }

    #[cfg(test)]
    fn cached_buckets(&self) -> usize {
        self.stores.read().map(|stores| stores.len()).unwrap_or(0)
    }
}

/// Object location for a key, kept verbatim. Keys come from uploads, so
/// characters such as `#`, `~` or `%` must not be percent-encoded.
fn object_location(key: &str) -> StorageResult<Path> {
    validate_key(key)?;
    Path::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))
}

#[async_trait]
impl Storage for S3Storage {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let location = object_location(key)?;
        let store = self.store_for(bucket)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::not_found(bucket, key),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()), level = "debug")]
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = object_location(key)?;
        let store = self.store_for(bucket)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let result: ObjectResult<_> = object_store::ObjectStore::put_opts(
            &store,
            &location,
            PutPayload::from(data),
            PutOptions::from(attributes),
        )
        .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let location = object_location(key)?;
        let store = self.store_for(bucket)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store.delete(&location).await;

        match result {
            Ok(()) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %bucket, key = %key, "S3 object already deleted");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let location = object_location(key)?;
        let store = self.store_for(bucket)?;
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = object_location(key)?;
        let store = self.store_for(bucket)?;

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?
            .to_string();

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "S3 presigned URL generated"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
