//! Constants shared across the pipeline.

/// Prefix prepended to the source key to form the processed object key.
pub const DEFAULT_PROCESSED_KEY_PREFIX: &str = "processed-";

/// Validity window of the link embedded in the outbound notification.
pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Queue visibility timeout; bounds how long one delivery may stay in flight.
pub const DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS: u64 = 300;

/// Deliveries of one message before it is dropped by the local queue.
pub const DEFAULT_QUEUE_MAX_RECEIVE_COUNT: u32 = 3;

/// Content type of every processed object.
pub const PROCESSED_CONTENT_TYPE: &str = "image/jpeg";

/// Body of the fixed acknowledgment returned by the handler for every batch.
pub const BATCH_ACK_MESSAGE: &str = "Image processing completed for all valid records.";

/// Default-channel rendering of the completion notification.
pub const NOTIFICATION_DEFAULT_TEXT: &str = "Your image has been processed successfully.";

/// Response body of the subscribe route.
pub const SUBSCRIBE_RESPONSE_MESSAGE: &str = "Subscription request has been sent.";

/// Response body of the upload route.
pub const UPLOAD_RESPONSE_MESSAGE: &str =
    "Image was uploaded successfully. Make sure to subscribe to receive the image link.";

/// Subscription protocol used by the subscribe route.
pub const SUBSCRIBE_PROTOCOL: &str = "email";
