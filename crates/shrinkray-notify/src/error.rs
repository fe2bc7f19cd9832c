use thiserror::Error;

/// Errors from the notification backends.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification service rejected the request.
    #[error("notification service error: {0}")]
    ServiceError(String),

    /// The request was throttled by the notification service.
    #[error("notification request throttled")]
    Throttled,

    /// A network or connection error occurred.
    #[error("notification connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("notification request timed out")]
    Timeout,

    /// The message could not be serialised.
    #[error("failed to serialise notification: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is invalid.
    #[error("invalid notification configuration: {0}")]
    Configuration(String),
}

impl NotifyError {
    /// Whether a later attempt (queue redelivery) could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotifyError::Throttled | NotifyError::Connection(_) | NotifyError::Timeout
        )
    }
}

/// Classify an SDK error string into the matching [`NotifyError`].
///
/// Looks for throttling, timeout and connection patterns; anything else is a
/// service error.
pub fn classify_sdk_error(error_str: &str) -> NotifyError {
    let lower = error_str.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        NotifyError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        NotifyError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        NotifyError::Connection(error_str.to_owned())
    } else {
        NotifyError::ServiceError(error_str.to_owned())
    }
}
