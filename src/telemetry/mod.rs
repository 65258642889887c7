//! Logging initialization.
//!
//! Sets up tracing-subscriber with an env filter and a stderr fmt layer, so
//! stdout stays free for the CLI's own output.

use tracing::Span;

use crate::error::{Error, Result};
use crate::schema::Audience;

/// Configuration for telemetry initialization.
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "appenv=debug").
    pub default_level: String,
    /// Compact single-line output.
    pub compact: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            compact: true,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the default filter is invalid or a subscriber was
/// already set.
pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(&config.default_level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.compact {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::Other(format!("failed to init tracing subscriber: {e}")))
}

/// Parse the filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> Result<tracing_subscriber::EnvFilter> {
    tracing_subscriber::EnvFilter::try_new(level)
        .map_err(|e| Error::Other(format!("invalid log filter: {e}")))
}

/// Span covering one resolution pass.
pub fn resolve_span(side: Audience, declared: usize) -> Span {
    tracing::info_span!("env.resolve", "env.side" = %side, "env.declared" = declared)
}
