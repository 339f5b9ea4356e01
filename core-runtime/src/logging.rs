//! # Logging Infrastructure
//!
//! Structured logging with the `tracing` crate:
//! - pretty, compact and JSON output formats
//! - module-level filtering via `EnvFilter` directives
//! - one-shot global initialization
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_filter("core_session=debug,provider_localfs=info");
//! init_logging(config)?;
//!
//! tracing::info!("player core started");
//! ```

use crate::error::{Result, RuntimeError};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format for machine parsing
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default level directive applied when `filter` is `None` and the
    /// `RUST_LOG` environment variable is unset
    pub default_level: &'static str,
    /// Custom filter string (e.g. "core_session=debug,bridge_traits=warn")
    pub filter: Option<String>,
    /// Display target module in log lines
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_level: "info",
            filter: None,
            display_target: true,
        }
    }
}

impl LoggingConfig {
    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set an explicit filter directive string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Build the `EnvFilter` this configuration resolves to.
    ///
    /// Precedence: explicit `filter`, then `RUST_LOG`, then `default_level`.
    pub fn build_filter(&self) -> Result<EnvFilter> {
        if let Some(directives) = &self.filter {
            return EnvFilter::try_new(directives)
                .map_err(|e| RuntimeError::InvalidFilter(e.to_string()));
        }
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.default_level))
            .map_err(|e| RuntimeError::InvalidFilter(e.to_string()))
    }
}

/// Initialize the global tracing subscriber.
///
/// May only be called once per process; a second call reports
/// [`RuntimeError::LoggingInit`] instead of panicking so embedding hosts that
/// already installed a subscriber keep working.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = config.build_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.display_target),
            )
            .try_init(),
    };

    result.map_err(|e| RuntimeError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_takes_precedence() {
        let config = LoggingConfig::default().with_filter("core_session=trace");
        let filter = config.build_filter().unwrap();
        assert!(filter.to_string().contains("core_session=trace"));
    }

    #[test]
    fn invalid_filter_directive_is_reported() {
        let config = LoggingConfig::default().with_filter("== not valid ==");
        assert!(matches!(
            config.build_filter(),
            Err(RuntimeError::InvalidFilter(_))
        ));
    }

    #[test]
    fn default_config_uses_info_level() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_level, "info");
        assert!(config.filter.is_none());
    }
}
