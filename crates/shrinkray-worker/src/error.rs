use shrinkray_core::models::EventParseError;
use shrinkray_notify::NotifyError;
use shrinkray_processing::{ResizeError, ValidationError};
use shrinkray_storage::StorageError;

/// Failure of one record, tagged with the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("message has no body")]
    MissingBody,

    #[error("malformed storage notification")]
    MalformedBody(#[source] EventParseError),

    #[error("failed to fetch {bucket}/{key}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("rejected payload {bucket}/{key}")]
    InvalidPayload {
        bucket: String,
        key: String,
        #[source]
        source: ValidationError,
    },

    #[error("failed to resize {bucket}/{key}")]
    Resize {
        bucket: String,
        key: String,
        #[source]
        source: ResizeError,
    },

    #[error("failed to store {bucket}/{key}")]
    Store {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to presign {bucket}/{key}")]
    Presign {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to publish notification for {key}")]
    Publish {
        key: String,
        #[source]
        source: NotifyError,
    },

    #[error("failed to delete source {bucket}/{key}")]
    Delete {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },
}

impl ProcessError {
    /// Step of the pipeline that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            ProcessError::MissingBody | ProcessError::MalformedBody(_) => "parse",
            ProcessError::Fetch { .. } => "fetch",
            ProcessError::InvalidPayload { .. } => "validate",
            ProcessError::Resize { .. } => "resize",
            ProcessError::Store { .. } => "store",
            ProcessError::Presign { .. } => "presign",
            ProcessError::Publish { .. } => "publish",
            ProcessError::Delete { .. } => "delete",
        }
    }

    /// Whether the failure was caused by the input rather than a dependency.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ProcessError::MissingBody
                | ProcessError::MalformedBody(_)
                | ProcessError::InvalidPayload { .. }
                | ProcessError::Resize { .. }
        )
    }
}
