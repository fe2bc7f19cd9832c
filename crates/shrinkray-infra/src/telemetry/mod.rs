//! Tracing subscriber initialization
//!
//! Output is human-readable by default. `LOG_FORMAT=json` switches to one JSON
//! object per line and `LOG_WITHOUT_TIME=true` drops timestamps, which the
//! function log sink adds on its own.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "shrinkray=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub json: bool,
    pub without_time: bool,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            json: false,
            without_time: false,
        }
    }
}

impl TelemetryOptions {
    pub fn from_env() -> Self {
        let json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let without_time = std::env::var("LOG_WITHOUT_TIME")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Self {
            json,
            without_time,
            ..Self::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(
    options: &TelemetryOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = match (options.json, options.without_time) {
        (true, true) => fmt::layer().json().without_time().boxed(),
        (true, false) => fmt::layer().json().boxed(),
        (false, true) => fmt::layer().with_target(false).without_time().boxed(),
        (false, false) => fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| options.default_filter.as_str().into()),
        )
        .try_init()?;

    tracing::debug!(
        json = options.json,
        without_time = options.without_time,
        "Telemetry initialized"
    );
    Ok(())
}
