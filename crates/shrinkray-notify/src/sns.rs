use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::error::DisplayErrorContext;
use shrinkray_core::constants::SUBSCRIBE_PROTOCOL;
use shrinkray_core::{NotificationBackend, NotificationMessage};
use tracing::{debug, error, info, instrument};

use crate::error::classify_sdk_error;
use crate::traits::{Notifier, NotifyResult, PublishReceipt, SubscribeReceipt};

/// Configuration for the SNS notifier.
#[derive(Debug, Clone)]
pub struct SnsConfig {
    pub region: Option<String>,
    pub topic_arn: String,
    /// Endpoint override for local development (e.g. `LocalStack`).
    pub endpoint_url: Option<String>,
}

impl SnsConfig {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            region: None,
            topic_arn: topic_arn.into(),
            endpoint_url: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// Notifier publishing to an SNS topic.
pub struct SnsNotifier {
    config: SnsConfig,
    client: aws_sdk_sns::Client,
}

impl std::fmt::Debug for SnsNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnsNotifier")
            .field("config", &self.config)
            .field("client", &"<SnsClient>")
            .finish()
    }
}

impl SnsNotifier {
    /// Build the SNS client from the default credential chain.
    pub async fn new(config: SnsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(ref region) = config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(ref endpoint) = config.endpoint_url {
            debug!(endpoint = %endpoint, "using custom SNS endpoint");
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let client = aws_sdk_sns::Client::new(&sdk_config);
        Self { config, client }
    }

    /// Create an `SnsNotifier` with a pre-built client.
    pub fn with_client(config: SnsConfig, client: aws_sdk_sns::Client) -> Self {
        Self { config, client }
    }

    pub fn topic_arn(&self) -> &str {
        &self.config.topic_arn
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[instrument(skip(self, message), fields(topic_arn = %self.config.topic_arn))]
    async fn publish(&self, message: &NotificationMessage) -> NotifyResult<PublishReceipt> {
        let body = message.to_json()?;
        let start = std::time::Instant::now();

        let result = self
            .client
            .publish()
            .topic_arn(&self.config.topic_arn)
            .message(body)
            .message_structure("json")
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(
                    error = %err_str,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "SNS publish failed"
                );
                classify_sdk_error(&err_str)
            })?;

        let message_id = result.message_id().unwrap_or("unknown").to_owned();
        info!(
            message_id = %message_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "SNS message published"
        );

        Ok(PublishReceipt {
            message_id,
            topic_arn: self.config.topic_arn.clone(),
        })
    }

    #[instrument(skip(self), fields(topic_arn = %self.config.topic_arn))]
    async fn subscribe_email(&self, endpoint: &str) -> NotifyResult<SubscribeReceipt> {
        let result = self
            .client
            .subscribe()
            .topic_arn(&self.config.topic_arn)
            .protocol(SUBSCRIBE_PROTOCOL)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "SNS subscribe failed");
                classify_sdk_error(&err_str)
            })?;

        let subscription_arn = result
            .subscription_arn()
            .unwrap_or("pending confirmation")
            .to_owned();
        info!(subscription_arn = %subscription_arn, "SNS subscription requested");

        Ok(SubscribeReceipt {
            subscription_arn,
            topic_arn: self.config.topic_arn.clone(),
            protocol: SUBSCRIBE_PROTOCOL.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    fn backend_type(&self) -> NotificationBackend {
        NotificationBackend::Sns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:ImageResizeTopic";

    #[test]
    fn config_builders() {
        let config = SnsConfig::new(TOPIC)
            .with_region("eu-west-1")
            .with_endpoint_url("http://localhost:4566");
        assert_eq!(config.topic_arn, TOPIC);
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[tokio::test]
    async fn new_builds_client_without_network() {
        let notifier = SnsNotifier::new(
            SnsConfig::new(TOPIC)
                .with_region("us-east-1")
                .with_endpoint_url("http://localhost:4566"),
        )
        .await;
        assert_eq!(notifier.topic_arn(), TOPIC);
        assert_eq!(notifier.backend_type(), NotificationBackend::Sns);
        assert!(format!("{notifier:?}").contains("<SnsClient>"));
    }
}
