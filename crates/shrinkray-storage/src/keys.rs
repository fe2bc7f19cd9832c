//! Bucket and key validation shared by storage backends.

use crate::{StorageError, StorageResult};

/// Bucket names become directory names for the local backend, so they must be
/// a single path segment.
pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket.contains('/') || bucket.contains('\\') || bucket.contains("..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Invalid bucket name: {:?}",
            bucket
        )));
    }
    Ok(())
}

/// Keys must be non-empty, relative and free of `..` segments.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
