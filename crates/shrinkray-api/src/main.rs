use shrinkray_api::{setup_routes, setup_state, start_server};
use shrinkray_core::Config;
use shrinkray_infra::{init_telemetry, TelemetryOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry(&TelemetryOptions::from_env()).map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment(),
        storage_backend = ?config.storage_backend(),
        notification_backend = ?config.notification_backend(),
        "Configuration loaded"
    );

    let state = setup_state(&config).await?;
    let app = setup_routes(state.clone());

    start_server(&config, app).await?;

    if let Some(queue) = &state.pipeline {
        queue.shutdown().await;
    }

    Ok(())
}
