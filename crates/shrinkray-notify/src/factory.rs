#[cfg(feature = "notify-sns")]
use crate::{SnsConfig, SnsNotifier};
use crate::{LogNotifier, NotificationBackend, Notifier, NotifyError, NotifyResult};
use shrinkray_core::Config;
use std::sync::Arc;

/// Create a notifier based on configuration
pub async fn create_notifier(config: &Config) -> NotifyResult<Arc<dyn Notifier>> {
    match config.notification_backend() {
        #[cfg(feature = "notify-sns")]
        NotificationBackend::Sns => {
            let topic_arn = config.topic_arn().ok_or_else(|| {
                NotifyError::Configuration("SNS_TOPIC_ARN not configured".to_string())
            })?;

            let mut sns_config = SnsConfig::new(topic_arn);
            if let Some(region) = config.aws_region() {
                sns_config = sns_config.with_region(region);
            }
            if let Some(endpoint) = config.sns_endpoint() {
                sns_config = sns_config.with_endpoint_url(endpoint);
            }

            tracing::info!(topic_arn = %topic_arn, "Using SNS notification backend");
            Ok(Arc::new(SnsNotifier::new(sns_config).await))
        }

        #[cfg(not(feature = "notify-sns"))]
        NotificationBackend::Sns => Err(NotifyError::Configuration(
            "SNS notification backend not available (notify-sns feature not enabled)".to_string(),
        )),

        NotificationBackend::Log => {
            tracing::info!("Using log notification backend");
            Ok(Arc::new(LogNotifier::new(
                config.topic_arn().map(String::from),
            )))
        }
    }
}
