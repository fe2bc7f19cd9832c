//! Resize handler
//!
//! Each queue record carries one object-created notification. Records are
//! processed sequentially and independently: a failing record is logged with
//! its full error chain and the batch moves on.

use async_trait::async_trait;
use aws_lambda_events::event::sqs::{SqsEvent, SqsMessage};
use shrinkray_core::constants::PROCESSED_CONTENT_TYPE;
use shrinkray_core::models::{processed_key, ParsedMessageBody};
use shrinkray_core::{Config, NotificationMessage, UploadNotification};
use shrinkray_notify::Notifier;
use shrinkray_processing::{ImageTransformer, PayloadValidator};
use shrinkray_storage::Storage;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::MessageHandler;
use crate::error::ProcessError;
use crate::report::{BatchReport, HandlerResponse, RecordOutcome, RecordReport, SkipReason};

/// What the handler needs from configuration.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub processed_bucket: String,
    pub processed_key_prefix: String,
    pub presigned_url_expiry: Duration,
    pub max_file_size: usize,
}

impl HandlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            processed_bucket: config.processed_bucket().to_string(),
            processed_key_prefix: config.processed_key_prefix().to_string(),
            presigned_url_expiry: Duration::from_secs(config.presigned_url_expiry_secs()),
            max_file_size: config.max_file_size_bytes(),
        }
    }
}

pub struct ResizeHandler {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    validator: PayloadValidator,
    settings: HandlerSettings,
}

impl ResizeHandler {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        settings: HandlerSettings,
    ) -> Self {
        // Content type is not checked here; the raw bucket only sees what the
        // upload route already accepted.
        let validator = PayloadValidator::new(settings.max_file_size, Vec::new());
        Self {
            storage,
            notifier,
            validator,
            settings,
        }
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Function entry point: process the batch and return the fixed
    /// acknowledgment whatever the per-record outcomes.
    pub async fn handle_event(&self, event: SqsEvent) -> HandlerResponse {
        self.handle_batch(&event).await;
        HandlerResponse::completed()
    }

    /// Process every record in order and summarise the outcomes.
    pub async fn handle_batch(&self, event: &SqsEvent) -> BatchReport {
        let start = Instant::now();
        let mut report = BatchReport::default();

        for message in &event.records {
            report.push(self.handle_message(message).await);
        }

        tracing::info!(
            records = report.len(),
            processed = report.processed(),
            duplicates = report.duplicates(),
            skipped = report.skipped(),
            failed = report.failed(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch completed"
        );

        report
    }

    async fn handle_message(&self, message: &SqsMessage) -> RecordReport {
        let message_id = message.message_id.clone();

        let parsed = message
            .body
            .as_deref()
            .ok_or(ProcessError::MissingBody)
            .and_then(|body| {
                UploadNotification::from_message_body(body).map_err(ProcessError::MalformedBody)
            });

        let upload = match parsed {
            Ok(ParsedMessageBody::Upload(upload)) => upload,
            Ok(ParsedMessageBody::TestEvent) => {
                tracing::info!(message_id = ?message_id, "Storage test notification, nothing to process");
                return RecordReport {
                    message_id,
                    bucket: None,
                    key: None,
                    outcome: RecordOutcome::Skipped {
                        reason: SkipReason::TestEvent,
                    },
                };
            }
            Err(err) => {
                let outcome = failure_outcome(err, message_id.as_deref(), None, None);
                return RecordReport {
                    message_id,
                    bucket: None,
                    key: None,
                    outcome,
                };
            }
        };

        let outcome = match self.process_upload(&upload).await {
            Ok(outcome) => outcome,
            Err(err) => failure_outcome(
                err,
                message_id.as_deref(),
                Some(&upload.bucket),
                Some(&upload.key),
            ),
        };

        RecordReport {
            message_id,
            bucket: Some(upload.bucket),
            key: Some(upload.key),
            outcome,
        }
    }

    /// Process a single queue message body outside of a batch.
    pub async fn process_body(&self, body: &str) -> Result<RecordOutcome, ProcessError> {
        match UploadNotification::from_message_body(body).map_err(ProcessError::MalformedBody)? {
            ParsedMessageBody::Upload(upload) => self.process_upload(&upload).await,
            ParsedMessageBody::TestEvent => Ok(RecordOutcome::Skipped {
                reason: SkipReason::TestEvent,
            }),
        }
    }

    /// Halve one uploaded image, store it, link it, notify and delete the source.
    #[tracing::instrument(skip(self, upload), fields(bucket = %upload.bucket, key = %upload.key))]
    pub async fn process_upload(
        &self,
        upload: &UploadNotification,
    ) -> Result<RecordOutcome, ProcessError> {
        let source_bucket = upload.bucket.as_str();
        let source_key = upload.key.as_str();
        let destination = self.settings.processed_bucket.as_str();

        if source_bucket == destination {
            tracing::warn!(
                bucket = %source_bucket,
                key = %source_key,
                "Processed bucket is the source bucket, skipping record to avoid recursive processing"
            );
            return Ok(RecordOutcome::Skipped {
                reason: SkipReason::RecursionGuard,
            });
        }

        let start = Instant::now();
        let target_key = processed_key(&self.settings.processed_key_prefix, source_key);

        let data = match self.storage.get(source_bucket, source_key).await {
            Ok(data) => data,
            Err(err) if err.is_not_found() => {
                if self
                    .storage
                    .exists(destination, &target_key)
                    .await
                    .unwrap_or(false)
                {
                    tracing::info!(
                        processed_key = %target_key,
                        "Source already consumed and processed object present, duplicate delivery"
                    );
                    return Ok(RecordOutcome::Duplicate {
                        processed_key: target_key,
                    });
                }
                return Err(ProcessError::Fetch {
                    bucket: source_bucket.to_string(),
                    key: source_key.to_string(),
                    source: err,
                });
            }
            Err(err) => {
                return Err(ProcessError::Fetch {
                    bucket: source_bucket.to_string(),
                    key: source_key.to_string(),
                    source: err,
                })
            }
        };

        self.validator
            .validate(&data)
            .map_err(|source| ProcessError::InvalidPayload {
                bucket: source_bucket.to_string(),
                key: source_key.to_string(),
                source,
            })?;

        let halved = ImageTransformer::halve(&data).map_err(|source| ProcessError::Resize {
            bucket: source_bucket.to_string(),
            key: source_key.to_string(),
            source,
        })?;

        self.storage
            .put(destination, &target_key, halved.data, PROCESSED_CONTENT_TYPE)
            .await
            .map_err(|source| ProcessError::Store {
                bucket: destination.to_string(),
                key: target_key.clone(),
                source,
            })?;

        let url = self
            .storage
            .presigned_get_url(destination, &target_key, self.settings.presigned_url_expiry)
            .await
            .map_err(|source| ProcessError::Presign {
                bucket: destination.to_string(),
                key: target_key.clone(),
                source,
            })?;

        let receipt = self
            .notifier
            .publish(&NotificationMessage::processed(&url))
            .await
            .map_err(|source| ProcessError::Publish {
                key: source_key.to_string(),
                source,
            })?;

        self.storage
            .delete(source_bucket, source_key)
            .await
            .map_err(|source| ProcessError::Delete {
                bucket: source_bucket.to_string(),
                key: source_key.to_string(),
                source,
            })?;

        tracing::info!(
            processed_bucket = %destination,
            processed_key = %target_key,
            source_width = halved.source_width,
            source_height = halved.source_height,
            width = halved.width,
            height = halved.height,
            notification_id = %receipt.message_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image processed"
        );

        Ok(RecordOutcome::Processed {
            processed_key: target_key,
            notification_id: receipt.message_id,
        })
    }
}

#[async_trait]
impl MessageHandler for ResizeHandler {
    async fn handle_batch(&self, event: &SqsEvent) -> BatchReport {
        ResizeHandler::handle_batch(self, event).await
    }
}

fn failure_outcome(
    err: ProcessError,
    message_id: Option<&str>,
    bucket: Option<&str>,
    key: Option<&str>,
) -> RecordOutcome {
    let stage = err.stage();
    let malformed_input = err.is_malformed_input();
    let chain = format!("{:#}", anyhow::Error::new(err));

    tracing::error!(
        message_id = ?message_id,
        bucket = ?bucket,
        key = ?key,
        stage,
        malformed_input,
        error = %chain,
        "Error processing record"
    );

    RecordOutcome::Failed {
        stage: stage.to_string(),
        error: chain,
    }
}
