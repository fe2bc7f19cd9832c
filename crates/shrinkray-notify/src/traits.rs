use async_trait::async_trait;
use serde::Serialize;
use shrinkray_core::{NotificationBackend, NotificationMessage};

use crate::NotifyError;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Acknowledgement of a published message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub message_id: String,
    pub topic_arn: String,
}

/// Acknowledgement of a subscribe request.
///
/// Email subscriptions stay pending until the recipient confirms, so the
/// subscription ARN is usually `"pending confirmation"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeReceipt {
    pub subscription_arn: String,
    pub topic_arn: String,
    pub protocol: String,
    pub endpoint: String,
}

/// Notification topic operations used by the pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a message with per-protocol renderings (`MessageStructure=json`).
    ///
    /// No retry is attempted; failures surface to the caller.
    async fn publish(&self, message: &NotificationMessage) -> NotifyResult<PublishReceipt>;

    /// Request an email subscription to the topic for `endpoint`.
    async fn subscribe_email(&self, endpoint: &str) -> NotifyResult<SubscribeReceipt>;

    fn backend_type(&self) -> NotificationBackend;
}
