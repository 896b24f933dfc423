//! Macro Correlations Binary
//!
//! Correlates the configured macro tickers against the reference asset and
//! prints the result, plus chart-ready series, as one JSON document.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin macro-correlations -- macro_tickers.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `MACRO_CORRELATIONS_CONFIG`: Config path when no argument is given (default: macro_tickers.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::sync::Arc;

use anyhow::{Context, Result};
use correlation_engine::chart::{correlation_chart, price_overlay};
use correlation_engine::config::{Config, load_config, resolve_config_path};
use correlation_engine::correlation::{CorrelationEngine, FailurePolicy};
use correlation_engine::feed::{CachedPriceSource, CsvDirectorySource, HistoryRequest};
use correlation_engine::series::extract_labeled;
use correlation_engine::table::PriceTable;
use correlation_engine::telemetry::init_telemetry;
use serde_json::json;
use tracing::{info, warn};

fn main() -> Result<()> {
    let arg = std::env::args().nth(1);
    let path = resolve_config_path(arg.as_deref());
    let config = load_config(Some(&path))
        .with_context(|| format!("Failed to load configuration from {path}"))?;

    init_telemetry(&config.observability.logging).context("Failed to initialize telemetry")?;

    info!(
        config = %path,
        tickers = config.tickers.len(),
        reference = %config.reference.symbol,
        "Starting macro correlations"
    );

    let engine = CorrelationEngine::new(config.engine.clone());
    engine
        .configure_thread_pool()
        .context("Failed to configure thread pool")?;

    let source = CachedPriceSource::new(CsvDirectorySource::new(&config.data.directory));
    let (reference_table, assets) = fetch_tables(&config, &source)?;

    let report = engine
        .run(&assets, &reference_table, &config.windows)
        .context("Correlation run failed")?;

    let reference = extract_labeled(&reference_table, "reference_table")?;
    let asset_series: Vec<_> = assets
        .iter()
        .filter_map(|(symbol, table)| {
            extract_labeled(table, symbol)
                .ok()
                .map(|series| (symbol.clone(), series))
        })
        .collect();

    let document = json!({
        "correlations": report.correlations,
        "failures": report.failures,
        "correlation_chart": correlation_chart(&report.correlations),
        "price_chart": price_overlay(&reference, &asset_series, &config.reference.symbol),
    });
    println!("{}", serde_json::to_string_pretty(&document)?);

    Ok(())
}

type Fetched = (Arc<PriceTable>, Vec<(String, Arc<PriceTable>)>);

fn fetch_tables(
    config: &Config,
    source: &CachedPriceSource<CsvDirectorySource>,
) -> Result<Fetched> {
    let reference_request = HistoryRequest::new(
        config.reference.symbol.clone(),
        config.reference.frequency,
        config.since,
    );
    let reference_table = source
        .fetch_shared(&reference_request)
        .with_context(|| format!("Failed to fetch reference {}", config.reference.symbol))?;

    let mut assets = Vec::with_capacity(config.tickers.len());
    for ticker in &config.tickers {
        let request = HistoryRequest::new(ticker.symbol.clone(), ticker.frequency, config.since);
        match source.fetch_shared(&request) {
            Ok(table) => assets.push((ticker.symbol.clone(), table)),
            Err(error) if config.engine.failure_policy == FailurePolicy::Skip => {
                warn!(
                    asset = %ticker.symbol,
                    error = %error,
                    "Skipping asset without price history"
                );
            }
            Err(error) => {
                return Err(error).with_context(|| format!("Failed to fetch {}", ticker.symbol));
            }
        }
    }

    Ok((reference_table, assets))
}
