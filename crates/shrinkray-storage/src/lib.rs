//! Shrinkray Storage Library
//!
//! Object access for the pipeline: fetching the raw upload, storing the
//! processed image, deleting the source and issuing time-bounded GET links.
//!
//! # Addressing
//!
//! Every operation names its bucket explicitly since the handler reads from one
//! bucket and writes to another. Keys are the object keys as decoded from the
//! storage notification. Bucket and key validation is shared by all backends
//! in the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use shrinkray_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
