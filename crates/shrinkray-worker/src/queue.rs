//! Local queue: an in-process stand-in for the queue-to-function trigger.
//!
//! Messages are delivered one at a time, as single-record batches, to a
//! [`MessageHandler`]. A delivery that outlives the visibility timeout is
//! redelivered until the maximum receive count is reached, then dropped.
//!
//! Shutdown: [`LocalQueue::shutdown`] stops the consumer after the delivery in
//! flight, if any. Messages still queued are discarded.

use aws_lambda_events::event::sqs::SqsEvent;
use serde_json::json;
use shrinkray_core::constants::{
    DEFAULT_QUEUE_MAX_RECEIVE_COUNT, DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS,
};
use shrinkray_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::context::MessageHandler;
use crate::report::BatchReport;

const REPORT_CHANNEL_CAPACITY: usize = 64;
const LOCAL_QUEUE_ARN: &str = "arn:aws:sqs:local:000000000000:ImageResizeQueue";

#[derive(Debug, Clone)]
pub struct LocalQueueConfig {
    pub visibility_timeout: Duration,
    pub max_receive_count: u32,
}

impl Default for LocalQueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(DEFAULT_QUEUE_VISIBILITY_TIMEOUT_SECS),
            max_receive_count: DEFAULT_QUEUE_MAX_RECEIVE_COUNT,
        }
    }
}

impl LocalQueueConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            visibility_timeout: Duration::from_secs(config.queue_visibility_timeout_secs()),
            max_receive_count: config.queue_max_receive_count().max(1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("local queue is shut down")]
    Closed,
}

#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    /// The handler finished within the visibility timeout.
    Completed(BatchReport),
    /// The delivery exceeded the visibility timeout and will be redelivered.
    TimedOut,
    /// The message reached the maximum receive count without completing.
    Dropped,
}

/// Published once per delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub message_id: String,
    pub receive_count: u32,
    pub outcome: DeliveryOutcome,
}

#[derive(Debug)]
struct QueuedMessage {
    message_id: String,
    body: String,
}

pub struct LocalQueue {
    sender: mpsc::UnboundedSender<QueuedMessage>,
    shutdown_tx: mpsc::Sender<()>,
    reports: broadcast::Sender<DeliveryReport>,
}

impl LocalQueue {
    /// Spawn the consumer task. Must be called within a Tokio runtime.
    pub fn start(handler: Arc<dyn MessageHandler>, config: LocalQueueConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);

        let reports_clone = reports.clone();
        tokio::spawn(async move {
            Self::consume(handler, config, receiver, shutdown_rx, reports_clone).await;
        });

        Self {
            sender,
            shutdown_tx,
            reports,
        }
    }

    /// Enqueue a notification body and return its message id.
    pub fn send(&self, body: impl Into<String>) -> Result<String, QueueError> {
        let message_id = Uuid::new_v4().to_string();
        self.sender
            .send(QueuedMessage {
                message_id: message_id.clone(),
                body: body.into(),
            })
            .map_err(|_| QueueError::Closed)?;

        tracing::debug!(message_id = %message_id, "Message enqueued");
        Ok(message_id)
    }

    /// Receive a [`DeliveryReport`] for every delivery attempt made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryReport> {
        self.reports.subscribe()
    }

    pub async fn shutdown(&self) {
        tracing::info!("Initiating local queue shutdown");
        let _ = self.shutdown_tx.send(()).await;
    }

    async fn consume(
        handler: Arc<dyn MessageHandler>,
        config: LocalQueueConfig,
        mut receiver: mpsc::UnboundedReceiver<QueuedMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
        reports: broadcast::Sender<DeliveryReport>,
    ) {
        tracing::info!(
            visibility_timeout_secs = config.visibility_timeout.as_secs(),
            max_receive_count = config.max_receive_count,
            "Local queue consumer started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Local queue consumer shutting down");
                    break;
                }
                message = receiver.recv() => match message {
                    Some(message) => Self::deliver(handler.as_ref(), &config, message, &reports).await,
                    None => break,
                },
            }
        }
    }

    async fn deliver(
        handler: &dyn MessageHandler,
        config: &LocalQueueConfig,
        message: QueuedMessage,
        reports: &broadcast::Sender<DeliveryReport>,
    ) {
        let mut receive_count = 0;

        loop {
            receive_count += 1;

            let event = match single_record_event(&message.message_id, &message.body, receive_count)
            {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(
                        message_id = %message.message_id,
                        error = %e,
                        "Failed to build queue event, dropping message"
                    );
                    Self::publish(reports, &message, receive_count, DeliveryOutcome::Dropped);
                    return;
                }
            };

            match tokio::time::timeout(config.visibility_timeout, handler.handle_batch(&event))
                .await
            {
                Ok(report) => {
                    Self::publish(
                        reports,
                        &message,
                        receive_count,
                        DeliveryOutcome::Completed(report),
                    );
                    return;
                }
                Err(_) if receive_count < config.max_receive_count => {
                    tracing::warn!(
                        message_id = %message.message_id,
                        receive_count,
                        visibility_timeout_secs = config.visibility_timeout.as_secs(),
                        "Delivery exceeded visibility timeout, redelivering"
                    );
                    Self::publish(reports, &message, receive_count, DeliveryOutcome::TimedOut);
                }
                Err(_) => {
                    tracing::error!(
                        message_id = %message.message_id,
                        receive_count,
                        "Message reached maximum receive count, dropping"
                    );
                    Self::publish(reports, &message, receive_count, DeliveryOutcome::Dropped);
                    return;
                }
            }
        }
    }

    fn publish(
        reports: &broadcast::Sender<DeliveryReport>,
        message: &QueuedMessage,
        receive_count: u32,
        outcome: DeliveryOutcome,
    ) {
        // No subscribers is fine.
        let _ = reports.send(DeliveryReport {
            message_id: message.message_id.clone(),
            receive_count,
            outcome,
        });
    }
}

/// Build the event the queue's event source mapping would deliver for one message.
pub fn single_record_event(
    message_id: &str,
    body: &str,
    receive_count: u32,
) -> Result<SqsEvent, serde_json::Error> {
    serde_json::from_value(json!({
        "Records": [{
            "messageId": message_id,
            "receiptHandle": format!("{}-{}", message_id, receive_count),
            "body": body,
            "attributes": {
                "ApproximateReceiveCount": receive_count.to_string(),
            },
            "messageAttributes": {},
            "eventSource": "aws:sqs",
            "eventSourceARN": LOCAL_QUEUE_ARN,
            "awsRegion": "local",
        }]
    }))
}
