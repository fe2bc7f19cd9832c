//! Operations behind the `shrinkray` command.

use anyhow::Context;
use serde::Serialize;
use std::path::Path;

use shrinkray_core::{Config, PipelineConfig, UploadNotification};
use shrinkray_notify::create_notifier;
use shrinkray_processing::{HalvedImage, ImageMetadata, ImageProcessor, ImageTransformer};
use shrinkray_stack::{ImagePipelineStack, StackProps};
use shrinkray_storage::create_storage;
use shrinkray_worker::{single_record_event, BatchReport, HandlerSettings, ResizeHandler};

/// Base URL of links issued by the local storage backend.
pub const LOCAL_BASE_URL: &str = "http://localhost:3000/files";

/// Validate the stack properties and render the template as pretty JSON.
pub fn render_template(props: StackProps) -> anyhow::Result<String> {
    props.validate().context("Invalid stack properties")?;
    let template = ImagePipelineStack::new(props).synth();
    serde_json::to_string_pretty(&template).context("Serialize template")
}

/// Filesystem storage under `root` and a log notifier, for running the
/// handler without any cloud resources.
pub fn local_config(root: &Path, raw_bucket: &str, processed_bucket: &str) -> Config {
    let mut pipeline = PipelineConfig::with_buckets(raw_bucket, processed_bucket);
    pipeline.local_storage_path = Some(root.display().to_string());
    pipeline.local_storage_base_url = Some(LOCAL_BASE_URL.to_string());
    Config::from(pipeline)
}

pub async fn build_handler(config: &Config) -> anyhow::Result<ResizeHandler> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;
    let notifier = create_notifier(config)
        .await
        .context("Failed to initialize notifier")?;
    Ok(ResizeHandler::new(
        storage,
        notifier,
        HandlerSettings::from_config(config),
    ))
}

/// Object-created notification body for `bucket`/`key`.
pub fn notification_body(bucket: &str, key: &str) -> anyhow::Result<String> {
    UploadNotification::new(bucket, key)
        .to_message_body()
        .context("Serialize upload notification")
}

/// Run the handler on one queue message body, as a batch of one record.
pub async fn invoke(handler: &ResizeHandler, body: &str) -> anyhow::Result<BatchReport> {
    let message_id = uuid::Uuid::new_v4().to_string();
    let event = single_record_event(&message_id, body, 1).context("Build queue event")?;
    Ok(handler.handle_batch(&event).await)
}

/// Halve the image at `input` and write the JPEG to `output`.
pub fn resize_file(input: &Path, output: &Path) -> anyhow::Result<HalvedImage> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let halved = ImageTransformer::halve(&data)
        .with_context(|| format!("Failed to resize {}", input.display()))?;
    std::fs::write(output, &halved.data)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(halved)
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    #[serde(flatten)]
    pub metadata: ImageMetadata,
    /// Output dimensions of the resize handler.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halved: Option<(u32, u32)>,
    /// Why the resize handler would reject this image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

pub fn inspect_file(path: &Path) -> anyhow::Result<InspectReport> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let metadata = ImageProcessor::extract_metadata(&data)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let (halved, rejection) =
        match ImageTransformer::halved_dimensions(metadata.width, metadata.height) {
            Ok(dimensions) => (Some(dimensions), None),
            Err(e) => (None, Some(e.to_string())),
        };

    Ok(InspectReport {
        metadata,
        halved,
        rejection,
    })
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_template_rejects_invalid_props() {
        let props = StackProps {
            batch_size: 11,
            ..StackProps::default()
        };
        let err = render_template(props).unwrap_err();
        assert!(format!("{:#}", err).contains("batch size must be between 1 and 10"));
    }

    #[test]
    fn render_template_is_pretty_json() {
        let rendered = render_template(StackProps::default()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["AWSTemplateFormatVersion"], "2010-09-09");
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn notification_body_round_trips_through_the_parser() {
        let body = notification_body("raw-images", "my photo.jpg").unwrap();
        match UploadNotification::from_message_body(&body).unwrap() {
            shrinkray_core::models::ParsedMessageBody::Upload(upload) => {
                assert_eq!(upload.bucket, "raw-images");
                assert_eq!(upload.key, "my photo.jpg");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn local_config_uses_local_backends() {
        let config = local_config(Path::new("/tmp/shrinkray"), "raw", "processed");
        assert_eq!(config.storage_backend(), shrinkray_core::StorageBackend::Local);
        assert_eq!(
            config.notification_backend(),
            shrinkray_core::NotificationBackend::Log
        );
        assert_eq!(config.processed_bucket(), "processed");
        assert_eq!(config.raw_bucket(), Some("raw"));
    }
}
