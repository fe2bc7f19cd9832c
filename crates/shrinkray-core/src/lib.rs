//! Shrinkray Core Library
//!
//! This crate provides the configuration, error types and event/message models
//! shared by every Shrinkray component: the resize handler, the local gateway,
//! the storage and notification backends, and the operator CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{validate_env, Config, NotificationBackend, PipelineConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{NotificationMessage, UploadNotification};
pub use storage_types::StorageBackend;
