//! Queue-triggered function entry point.

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{service_fn, LambdaEvent};
use shrinkray_core::{validate_env, Config};
use shrinkray_infra::{init_telemetry, TelemetryOptions};
use shrinkray_notify::create_notifier;
use shrinkray_storage::create_storage;
use shrinkray_worker::{HandlerSettings, ResizeHandler};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    init_telemetry(&TelemetryOptions {
        without_time: true,
        ..TelemetryOptions::from_env()
    })?;

    validate_env()?;
    let config = Config::from_env()?;

    let storage = create_storage(&config).await?;
    let notifier = create_notifier(&config).await?;
    let settings = HandlerSettings::from_config(&config);

    tracing::info!(
        processed_bucket = %settings.processed_bucket,
        storage_backend = ?storage.backend_type(),
        notification_backend = ?notifier.backend_type(),
        "Resize handler initialized"
    );

    let handler = Arc::new(ResizeHandler::new(storage, notifier, settings));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let handler = handler.clone();
        async move {
            tracing::debug!(request_id = %event.context.request_id, records = event.payload.records.len(), "Invocation received");
            Ok::<_, lambda_runtime::Error>(handler.handle_event(event.payload).await)
        }
    }))
    .await
}
