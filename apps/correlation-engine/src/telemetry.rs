//! Tracing setup.
//!
//! Installs a `tracing-subscriber` fmt subscriber writing to stderr, so
//! stdout stays free for the JSON report.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives, takes precedence over `observability.logging.level`
//! - `observability.logging.format`: `json` or `pretty`
//!
//! # Usage
//!
//! ```rust,ignore
//! use correlation_engine::telemetry::init_telemetry;
//!
//! init_telemetry(&config.observability.logging)?;
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Telemetry setup errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("Invalid log level '{level}': {source}")]
    InvalidFilter {
        /// Configured level.
        level: String,
        /// Parser error.
        source: tracing_subscriber::filter::ParseError,
    },

    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Build the level filter: `RUST_LOG` when set, else the configured level.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when `RUST_LOG` is unset and
/// the configured level does not parse.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|source| TelemetryError::InvalidFilter {
        level: config.level.clone(),
        source,
    })
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber is already set.
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let result = if config.format == "pretty" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .try_init()
    };

    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::debug!(format = %config.format, "Telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "info,correlation_engine=notalevel".to_string(),
            format: "json".to_string(),
        };
        let Err(err) = env_filter(&config) else {
            panic!("malformed directive should fail");
        };
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }

    #[test]
    fn test_default_level_parses() {
        assert!(env_filter(&LoggingConfig::default()).is_ok());
    }
}
