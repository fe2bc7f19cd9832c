//! Application setup: shared services, routes and the server loop.

pub mod routes;
pub mod server;

pub use routes::setup_routes;
pub use server::start_server;

use crate::state::AppState;
use shrinkray_core::Config;
use shrinkray_notify::create_notifier;
use shrinkray_storage::create_storage;
use shrinkray_worker::{HandlerSettings, LocalQueue, LocalQueueConfig, ResizeHandler};
use std::sync::Arc;

/// Build storage and notifier once and, when enabled, the local pipeline that
/// consumes uploads to the raw bucket.
pub async fn setup_state(config: &Config) -> Result<Arc<AppState>, anyhow::Error> {
    let storage = create_storage(config).await?;
    let notifier = create_notifier(config).await?;

    let pipeline = if config.local_pipeline_enabled() {
        let handler = ResizeHandler::new(
            storage.clone(),
            notifier.clone(),
            HandlerSettings::from_config(config),
        );
        tracing::info!(
            raw_bucket = ?config.raw_bucket(),
            processed_bucket = %config.processed_bucket(),
            "Local pipeline enabled"
        );
        Some(LocalQueue::start(
            Arc::new(handler),
            LocalQueueConfig::from_config(config),
        ))
    } else {
        None
    };

    Ok(Arc::new(AppState::new(config, storage, notifier, pipeline)))
}
