//! Tracing subscriber initialization.
//!
//! Library code only emits `tracing` events; binaries and test harnesses
//! that embed the store call [`init_telemetry`] once at startup.

#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::LineageResult;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Whether to include the event target (module path).
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "info,lineage=debug,sqlx=warn".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
            with_target: default_with_target(),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over [`TelemetryConfig::filter`]. Fails if a
/// global subscriber is already installed.
#[cfg(feature = "telemetry")]
pub fn init_telemetry(config: &TelemetryConfig) -> LineageResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(config.with_target))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init(),
    };

    result.map_err(|e| crate::LineageError::Internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!(filter = %config.filter, format = ?config.format, "Telemetry initialized");
    Ok(())
}

/// Placeholder for when telemetry feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_telemetry(_config: &TelemetryConfig) -> LineageResult<()> {
    Ok(())
}
