use shrinkray_core::Config;
use shrinkray_notify::Notifier;
use shrinkray_processing::PayloadValidator;
use shrinkray_storage::Storage;
use shrinkray_worker::LocalQueue;
use std::sync::Arc;

/// Shared state behind the gateway routes.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub notifier: Arc<dyn Notifier>,
    pub upload: UploadConfig,
    /// Present when uploads to the raw bucket should trigger the local pipeline.
    pub pipeline: Option<LocalQueue>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Buckets the upload route may write to.
    pub allowed_buckets: Vec<String>,
    pub raw_bucket: Option<String>,
    pub validator: PayloadValidator,
}

impl UploadConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_buckets: config
                .upload_buckets()
                .into_iter()
                .map(String::from)
                .collect(),
            raw_bucket: config.raw_bucket().map(String::from),
            validator: PayloadValidator::new(
                config.max_file_size_bytes(),
                config.allowed_content_types().to_vec(),
            ),
        }
    }

    pub fn is_allowed_bucket(&self, bucket: &str) -> bool {
        self.allowed_buckets.iter().any(|b| b == bucket)
    }

    pub fn is_raw_bucket(&self, bucket: &str) -> bool {
        self.raw_bucket.as_deref() == Some(bucket)
    }
}

impl AppState {
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        pipeline: Option<LocalQueue>,
    ) -> Self {
        Self {
            storage,
            notifier,
            upload: UploadConfig::from_config(config),
            pipeline,
        }
    }
}
