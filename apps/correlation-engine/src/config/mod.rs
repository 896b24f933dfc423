//! Configuration loading for the correlation report.
//!
//! Provides YAML loading, validation, and environment variable
//! interpolation for the macro ticker list and engine settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use correlation_engine::config::load_config;
//!
//! // MACRO_CORRELATIONS_CONFIG, or macro_tickers.yaml
//! let config = load_config(None)?;
//!
//! // Explicit path
//! let config = load_config(Some("configs/weekly.yaml"))?;
//!
//! for ticker in &config.tickers {
//!     println!("{} ({})", ticker.symbol, ticker.frequency);
//! }
//! ```

mod observability;
mod tickers;

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::correlation::{EngineConfig, WindowSpec};

pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use tickers::{DEFAULT_REFERENCE_SYMBOL, MacroTicker};

/// Config file used when neither an explicit path nor the env override is given.
pub const DEFAULT_CONFIG_PATH: &str = "macro_tickers.yaml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "MACRO_CORRELATIONS_CONFIG";

/// Window sizes used when the config does not list any.
pub const DEFAULT_WINDOWS: [usize; 4] = [15, 30, 60, 90];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assets to correlate against the reference.
    pub tickers: Vec<MacroTicker>,
    /// Reference asset.
    pub reference: MacroTicker,
    /// First date of history to request. `null` requests the default bar count.
    pub since: Option<NaiveDate>,
    /// Trailing window sizes, in report order.
    pub windows: Vec<WindowSpec>,
    /// Where price history is read from.
    pub data: DataConfig,
    /// Engine behavior.
    pub engine: EngineConfig,
    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            reference: MacroTicker::reference(),
            since: NaiveDate::from_ymd_opt(2017, 12, 31),
            windows: DEFAULT_WINDOWS
                .iter()
                .filter_map(|&size| WindowSpec::new(size).ok())
                .collect(),
            data: DataConfig::default(),
            engine: EngineConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Price history location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding one CSV export per asset.
    pub directory: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Resolve the config path: explicit path, then `MACRO_CORRELATIONS_CONFIG`,
/// then [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn resolve_config_path(path: Option<&str>) -> String {
    path.map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. See [`resolve_config_path`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = resolve_config_path(path);

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// An empty document yields the defaults with no tickers.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config = if is_blank_document(&interpolated) {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

fn is_blank_document(yaml: &str) -> bool {
    yaml.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (i, ticker) in config.tickers.iter().enumerate() {
        if ticker.symbol.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tickers[{i}].ticker must not be empty"
            )));
        }
        if !seen.insert(ticker.symbol.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "ticker '{}' is listed more than once",
                ticker.symbol
            )));
        }
    }

    if config.reference.symbol.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "reference.ticker must not be empty".to_string(),
        ));
    }

    if config.engine.parallel.min_parallel_assets == 0 {
        return Err(ConfigError::ValidationError(
            "engine.parallel.min_parallel_assets must be at least 1".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::correlation::FailurePolicy;
    use crate::feed::Frequency;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.tickers.is_empty());
        assert_eq!(config.reference.symbol, "INDEX:BTCUSD");
        assert_eq!(config.reference.frequency, Frequency::Daily);
        assert_eq!(config.since, NaiveDate::from_ymd_opt(2017, 12, 31));
        let sizes: Vec<usize> = config.windows.iter().map(|w| w.get()).collect();
        assert_eq!(sizes, DEFAULT_WINDOWS);
        assert_eq!(config.observability.logging.format, "json");
    }

    #[test]
    fn test_empty_document_yields_no_tickers() {
        for yaml in ["", "\n# nothing here\n", "---\n"] {
            let config = match load_config_from_string(yaml) {
                Ok(c) => c,
                Err(e) => panic!("empty document should load: {e}"),
            };
            assert!(config.tickers.is_empty());
            assert_eq!(config.windows.len(), 4);
        }
    }

    #[test]
    fn test_load_ticker_list() {
        let yaml = r"
tickers:
  - ticker: TVC:GOLD
    frequency: D
  - ticker: TVC:DXY
    frequency: W
  - ticker: SP:SPX
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load ticker list: {e}"),
        };
        let symbols: Vec<&str> = config.tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["TVC:GOLD", "TVC:DXY", "SP:SPX"]);
        assert_eq!(config.tickers[1].frequency, Frequency::Weekly);
        assert_eq!(config.tickers[2].frequency, Frequency::Daily);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r"
tickers:
  - ticker: TVC:GOLD
reference:
  ticker: INDEX:ETHUSD
  frequency: W
since: 2020-01-01
windows: [10, 20]
data:
  directory: /var/lib/prices
engine:
  failure_policy: skip
  parallel:
    max_threads: 2
    min_parallel_assets: 4
observability:
  logging:
    level: debug
    format: pretty
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };
        assert_eq!(config.reference.symbol, "INDEX:ETHUSD");
        assert_eq!(config.reference.frequency, Frequency::Weekly);
        assert_eq!(config.since, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(config.windows.len(), 2);
        assert_eq!(config.data.directory, PathBuf::from("/var/lib/prices"));
        assert_eq!(config.engine.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.engine.parallel.max_threads, 2);
        assert_eq!(config.observability.logging.level, "debug");
    }

    #[test]
    fn test_since_null_disables_start_date() {
        let Ok(config) = load_config_from_string("since: null\n") else {
            panic!("null since should load");
        };
        assert_eq!(config.since, None);
    }

    #[test]
    fn test_zero_window_rejected() {
        let result = load_config_from_string("windows: [15, 0]\n");
        let Err(err) = result else {
            panic!("expected error for zero window");
        };
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_duplicate_ticker() {
        let yaml = r"
tickers:
  - ticker: TVC:GOLD
  - ticker: TVC:GOLD
    frequency: W
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate ticker");
        };
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_validation_missing_ticker_symbol() {
        let yaml = r"
tickers:
  - frequency: D
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for missing ticker");
        };
        assert!(err.to_string().contains("tickers[0].ticker"));
    }

    #[test]
    fn test_validation_invalid_log_format() {
        let yaml = r"
observability:
  logging:
    format: xml
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for log format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_validation_zero_parallel_threshold() {
        let yaml = r"
engine:
  parallel:
    min_parallel_assets: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero threshold");
        };
        assert!(err.to_string().contains("min_parallel_assets"));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "directory: ${MACRO_CORRELATIONS_TEST_NONEXISTENT_VAR:-data}";
        assert_eq!(interpolate_env_vars(input), "directory: data");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "directory: ${MACRO_CORRELATIONS_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "directory: ");
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tickers:\n  - ticker: TVC:US10Y\n    frequency: M").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.tickers.len(), 1);
        assert_eq!(config.tickers[0].frequency, Frequency::Monthly);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let Err(err) = load_config(path.to_str()) else {
            panic!("missing file should fail");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(resolve_config_path(Some("custom.yaml")), "custom.yaml");
    }
}
