//! Process-wide subscriber bootstrap
//!
//! One call at startup wires the `tracing` subscriber every per-call record
//! is emitted through. `RUST_LOG` overrides the configured default
//! directive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output encoding for emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per record; the production default.
    Json,
    /// Human-readable output for local development.
    Text,
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Record encoding (default: [`LogFormat::Json`]).
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset (default: `info`).
    pub default_directive: String,
    /// Service name stamped on the startup record (default: package name).
    pub service: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_directive: "info".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// A global subscriber was already installed.
    #[error("subscriber init: {0}")]
    Init(String),
}

/// Install the global subscriber.
///
/// Must be called once, before the first request is served.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?,
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?,
    }

    tracing::info!(service = %config.service, "logging initialised");
    Ok(())
}
