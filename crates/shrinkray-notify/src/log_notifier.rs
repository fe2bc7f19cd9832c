use async_trait::async_trait;
use shrinkray_core::constants::SUBSCRIBE_PROTOCOL;
use shrinkray_core::{NotificationBackend, NotificationMessage};
use uuid::Uuid;

use crate::traits::{Notifier, NotifyResult, PublishReceipt, SubscribeReceipt};

const LOCAL_TOPIC: &str = "local:log";

/// Notifier for local runs: messages go to the log, receipts carry random ids.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    topic_arn: String,
}

impl LogNotifier {
    pub fn new(topic_arn: Option<String>) -> Self {
        Self {
            topic_arn: topic_arn.unwrap_or_else(|| LOCAL_TOPIC.to_string()),
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: &NotificationMessage) -> NotifyResult<PublishReceipt> {
        let body = message.to_json()?;
        let message_id = Uuid::new_v4().to_string();

        tracing::info!(
            topic_arn = %self.topic_arn,
            message_id = %message_id,
            message = %body,
            "Notification published"
        );

        Ok(PublishReceipt {
            message_id,
            topic_arn: self.topic_arn.clone(),
        })
    }

    async fn subscribe_email(&self, endpoint: &str) -> NotifyResult<SubscribeReceipt> {
        tracing::info!(
            topic_arn = %self.topic_arn,
            endpoint = %endpoint,
            protocol = SUBSCRIBE_PROTOCOL,
            "Subscription requested"
        );

        Ok(SubscribeReceipt {
            subscription_arn: "pending confirmation".to_string(),
            topic_arn: self.topic_arn.clone(),
            protocol: SUBSCRIBE_PROTOCOL.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    fn backend_type(&self) -> NotificationBackend {
        NotificationBackend::Log
    }
}
