//! Configuration module
//!
//! Every Shrinkray process (the queue-triggered handler, the local gateway and
//! the CLI) reads the same environment-driven configuration. Required values
//! mirror what the deployed function receives: the destination bucket name and
//! the notification topic identifier.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_PRESIGNED_URL_EXPIRY_SECS, DEFAULT_PROCESSED_KEY_PREFIX,
    DEFAULT_QUEUE_MAX_RECEIVE_COUNT, DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const MAX_FILE_SIZE_MB: usize = 10;

/// Environment variables the deployed handler cannot run without.
const REQUIRED_HANDLER_VARS: &[&str] = &["PROCESSED_BUCKET_NAME"];

/// Notification backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    /// Publish to an SNS topic.
    Sns,
    /// Write notifications to the log (local development).
    Log,
}

impl FromStr for NotificationBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sns" => Ok(NotificationBackend::Sns),
            "log" => Ok(NotificationBackend::Log),
            _ => Err(anyhow::anyhow!("Invalid notification backend: {}", s)),
        }
    }
}

/// Base configuration shared by every process
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
        }
    }
}

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub base: BaseConfig,
    // Buckets and topic
    pub processed_bucket: String,
    pub raw_bucket: Option<String>,
    pub topic_arn: Option<String>,
    // AWS configuration
    pub aws_region: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, LocalStack, etc.)
    pub sns_endpoint: Option<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Notification configuration
    pub notification_backend: NotificationBackend,
    // Processing configuration
    pub presigned_url_expiry_secs: u64,
    pub processed_key_prefix: String,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    // Local queue emulation
    pub local_pipeline_enabled: bool,
    pub queue_visibility_timeout_secs: u64,
    pub queue_max_receive_count: u32,
}

impl PipelineConfig {
    /// Configuration for a local (filesystem + log) pipeline between two buckets.
    ///
    /// Used by tests and by the CLI when no environment is available.
    pub fn with_buckets(raw_bucket: impl Into<String>, processed_bucket: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::default(),
            processed_bucket: processed_bucket.into(),
            raw_bucket: Some(raw_bucket.into()),
            topic_arn: None,
            aws_region: None,
            s3_region: None,
            s3_endpoint: None,
            sns_endpoint: None,
            storage_backend: StorageBackend::Local,
            local_storage_path: None,
            local_storage_base_url: None,
            notification_backend: NotificationBackend::Log,
            presigned_url_expiry_secs: DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            processed_key_prefix: DEFAULT_PROCESSED_KEY_PREFIX.to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: default_allowed_content_types(),
            local_pipeline_enabled: false,
            queue_visibility_timeout_secs: DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS,
            queue_max_receive_count: DEFAULT_QUEUE_MAX_RECEIVE_COUNT,
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let processed_bucket = non_empty_var("PROCESSED_BUCKET_NAME")
            .ok_or_else(|| anyhow::anyhow!("PROCESSED_BUCKET_NAME must be set"))?;

        let storage_backend = match non_empty_var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let notification_backend = match non_empty_var("NOTIFICATION_BACKEND") {
            Some(value) => value.parse()?,
            None => NotificationBackend::Sns,
        };

        let max_file_size_bytes =
            mb_to_bytes(parse_var("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB))?;

        let allowed_content_types = non_empty_var("ALLOWED_CONTENT_TYPES")
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_allowed_content_types);

        let config = PipelineConfig {
            base: BaseConfig {
                server_port: parse_var("PORT", SERVER_PORT),
                environment,
            },
            processed_bucket,
            raw_bucket: non_empty_var("RAW_BUCKET_NAME"),
            topic_arn: non_empty_var("SNS_TOPIC_ARN"),
            aws_region: non_empty_var("AWS_REGION"),
            s3_region: non_empty_var("S3_REGION"),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            sns_endpoint: non_empty_var("SNS_ENDPOINT"),
            storage_backend,
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty_var("LOCAL_STORAGE_BASE_URL"),
            notification_backend,
            presigned_url_expiry_secs: parse_var(
                "PRESIGNED_URL_EXPIRY_SECS",
                DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            ),
            processed_key_prefix: non_empty_var("PROCESSED_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_PROCESSED_KEY_PREFIX.to_string()),
            max_file_size_bytes,
            allowed_content_types,
            local_pipeline_enabled: parse_var("LOCAL_PIPELINE_ENABLED", false),
            queue_visibility_timeout_secs: parse_var(
                "QUEUE_VISIBILITY_TIMEOUT_SECS",
                DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS,
            ),
            queue_max_receive_count: parse_var(
                "QUEUE_MAX_RECEIVE_COUNT",
                DEFAULT_QUEUE_MAX_RECEIVE_COUNT,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.processed_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("PROCESSED_BUCKET_NAME must not be empty"));
        }

        if self.raw_bucket.as_deref() == Some(self.processed_bucket.as_str()) {
            return Err(anyhow::anyhow!(
                "RAW_BUCKET_NAME and PROCESSED_BUCKET_NAME must differ to avoid recursive processing"
            ));
        }

        if self.presigned_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_EXPIRY_SECS must be greater than zero"
            ));
        }

        // Presigned S3 URLs cannot outlive seven days.
        if self.presigned_url_expiry_secs > 7 * 24 * 3600 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_EXPIRY_SECS must not exceed 604800 (7 days)"
            ));
        }

        if self.queue_max_receive_count == 0 {
            return Err(anyhow::anyhow!(
                "QUEUE_MAX_RECEIVE_COUNT must be at least 1"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.notification_backend == NotificationBackend::Sns && self.topic_arn.is_none() {
            return Err(anyhow::anyhow!(
                "SNS_TOPIC_ARN must be set when using SNS notification backend"
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PipelineConfig>);

impl Config {
    fn as_pipeline(&self) -> &PipelineConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_pipeline().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_pipeline().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_pipeline().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_pipeline().base.environment
    }

    pub fn processed_bucket(&self) -> &str {
        &self.as_pipeline().processed_bucket
    }

    pub fn raw_bucket(&self) -> Option<&str> {
        self.as_pipeline().raw_bucket.as_deref()
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.as_pipeline().topic_arn.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_pipeline().aws_region.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_pipeline().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_pipeline().s3_endpoint.as_deref()
    }

    pub fn sns_endpoint(&self) -> Option<&str> {
        self.as_pipeline().sns_endpoint.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_pipeline().storage_backend
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_pipeline().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_pipeline().local_storage_base_url.as_deref()
    }

    pub fn notification_backend(&self) -> NotificationBackend {
        self.as_pipeline().notification_backend
    }

    pub fn presigned_url_expiry_secs(&self) -> u64 {
        self.as_pipeline().presigned_url_expiry_secs
    }

    pub fn processed_key_prefix(&self) -> &str {
        &self.as_pipeline().processed_key_prefix
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_pipeline().max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_pipeline().allowed_content_types
    }

    pub fn local_pipeline_enabled(&self) -> bool {
        self.as_pipeline().local_pipeline_enabled
    }

    pub fn queue_visibility_timeout_secs(&self) -> u64 {
        self.as_pipeline().queue_visibility_timeout_secs
    }

    pub fn queue_max_receive_count(&self) -> u32 {
        self.as_pipeline().queue_max_receive_count
    }

    /// Buckets the upload route may write to (the gateway role's scope).
    pub fn upload_buckets(&self) -> Vec<&str> {
        let mut buckets = Vec::with_capacity(2);
        if let Some(raw) = self.raw_bucket() {
            buckets.push(raw);
        }
        buckets.push(self.processed_bucket());
        buckets
    }
}

impl From<PipelineConfig> for Config {
    fn from(config: PipelineConfig) -> Self {
        Config(Box::new(config))
    }
}

/// Report required handler variables that are missing from the environment.
pub fn validate_env() -> Result<(), anyhow::Error> {
    let missing: Vec<&str> = REQUIRED_HANDLER_VARS
        .iter()
        .copied()
        .filter(|name| non_empty_var(name).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Missing required environment variables: {}",
            missing.join(", ")
        ))
    }
}

fn default_allowed_content_types() -> Vec<String> {
    ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn mb_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}
