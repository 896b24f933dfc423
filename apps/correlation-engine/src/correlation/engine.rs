//! Multi-asset correlation runs.
//!
//! The reference series is validated and extracted once, then shared
//! read-only by every per-asset job. Jobs run on the rayon pool once the
//! asset count reaches `ParallelConfig::min_parallel_assets`; results are
//! assembled by asset identifier in input order either way, so completion
//! order never shows in the output.

use std::borrow::Borrow;
use std::time::Instant;

use rayon::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{Level, info, span, warn};

use super::aggregate::{CorrelationMap, correlate_series};
use super::config::{EngineConfig, FailurePolicy};
use super::window::WindowSpec;
use crate::error::CorrelationError;
use crate::series::{PriceSeries, extract_labeled};
use crate::table::PriceTable;

/// Correlation maps keyed by asset identifier, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCorrelationMap {
    entries: Vec<(String, CorrelationMap)>,
}

impl AssetCorrelationMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, asset: String, correlations: CorrelationMap) {
        match self.entries.iter_mut().find(|(a, _)| *a == asset) {
            Some(entry) => entry.1 = correlations,
            None => self.entries.push((asset, correlations)),
        }
    }

    /// Correlations for `asset`.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<&CorrelationMap> {
        self.entries
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, c)| c)
    }

    /// Asset identifiers in input order.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(a, _)| a.as_str())
    }

    /// `(asset, correlations)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CorrelationMap)> {
        self.entries.iter().map(|(a, c)| (a.as_str(), c))
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AssetCorrelationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (asset, correlations) in &self.entries {
            map.serialize_entry(asset, correlations)?;
        }
        map.end()
    }
}

/// An asset left out of a [`FailurePolicy::Skip`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    /// Asset identifier.
    pub asset: String,
    /// Why it was left out.
    pub error: CorrelationError,
}

impl Serialize for AssetFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("asset", &self.asset)?;
        map.serialize_entry("kind", &self.error.kind())?;
        map.serialize_entry("message", &self.error.to_string())?;
        map.end()
    }
}

/// Outcome of a multi-asset run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationReport {
    /// Correlations for every asset that passed validation.
    pub correlations: AssetCorrelationMap,
    /// Skipped assets. Always empty under [`FailurePolicy::Abort`].
    pub failures: Vec<AssetFailure>,
}

/// Multi-asset correlation engine.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    config: EngineConfig,
}

impl CorrelationEngine {
    /// Create an engine with the given settings.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configure the global rayon thread pool.
    ///
    /// # Errors
    ///
    /// Returns error if the global pool was already initialized.
    pub fn configure_thread_pool(&self) -> Result<(), CorrelationError> {
        if self.config.parallel.max_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.parallel.max_threads)
                .build_global()
                .map_err(|e| CorrelationError::ThreadPool {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Get effective thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if self.config.parallel.max_threads > 0 {
            self.config.parallel.max_threads
        } else {
            rayon::current_num_threads()
        }
    }

    /// Correlate every asset against the reference for every window.
    ///
    /// The reference table is validated before any asset is touched. Asset
    /// validation failures follow the configured [`FailurePolicy`]; under
    /// `Abort` the failure of the earliest asset in input order is returned.
    pub fn run<T>(
        &self,
        assets: &[(String, T)],
        reference_table: &PriceTable,
        windows: &[WindowSpec],
    ) -> Result<CorrelationReport, CorrelationError>
    where
        T: Borrow<PriceTable> + Sync,
    {
        let started = Instant::now();
        let reference = extract_labeled(reference_table, "reference_table")?;

        let report = if assets.len() >= self.config.parallel.min_parallel_assets.max(1) {
            self.run_parallel(assets, &reference, windows)?
        } else {
            self.run_sequential(assets, &reference, windows)?
        };

        info!(
            assets = assets.len(),
            correlated = report.correlations.len(),
            skipped = report.failures.len(),
            windows = windows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Correlation run complete"
        );

        Ok(report)
    }

    fn run_parallel<T>(
        &self,
        assets: &[(String, T)],
        reference: &PriceSeries<'_>,
        windows: &[WindowSpec],
    ) -> Result<CorrelationReport, CorrelationError>
    where
        T: Borrow<PriceTable> + Sync,
    {
        info!(
            "Correlating {} assets on {} threads",
            assets.len(),
            self.effective_thread_count()
        );

        let outcomes: Vec<Result<CorrelationMap, CorrelationError>> = assets
            .par_iter()
            .map(|(asset, table)| correlate_asset(asset, table.borrow(), reference, windows))
            .collect();

        let mut report = CorrelationReport::default();
        for ((asset, _), outcome) in assets.iter().zip(outcomes) {
            self.record(&mut report, asset, outcome)?;
        }
        Ok(report)
    }

    fn run_sequential<T>(
        &self,
        assets: &[(String, T)],
        reference: &PriceSeries<'_>,
        windows: &[WindowSpec],
    ) -> Result<CorrelationReport, CorrelationError>
    where
        T: Borrow<PriceTable>,
    {
        let mut report = CorrelationReport::default();
        for (asset, table) in assets {
            let outcome = correlate_asset(asset, table.borrow(), reference, windows);
            self.record(&mut report, asset, outcome)?;
        }
        Ok(report)
    }

    fn record(
        &self,
        report: &mut CorrelationReport,
        asset: &str,
        outcome: Result<CorrelationMap, CorrelationError>,
    ) -> Result<(), CorrelationError> {
        match outcome {
            Ok(correlations) => {
                report.correlations.insert(asset.to_string(), correlations);
                Ok(())
            }
            Err(error) => match self.config.failure_policy {
                FailurePolicy::Abort => Err(error),
                FailurePolicy::Skip => {
                    warn!(
                        asset,
                        kind = error.kind().reason(),
                        error = %error,
                        "Skipping asset"
                    );
                    report.failures.push(AssetFailure {
                        asset: asset.to_string(),
                        error,
                    });
                    Ok(())
                }
            },
        }
    }
}

fn correlate_asset(
    asset: &str,
    table: &PriceTable,
    reference: &PriceSeries<'_>,
    windows: &[WindowSpec],
) -> Result<CorrelationMap, CorrelationError> {
    let _span = span!(Level::DEBUG, "asset_correlation", asset = %asset).entered();
    let series = extract_labeled(table, &format!("assets[{asset}]"))?;
    Ok(correlate_series(&series, reference, windows))
}

/// Correlate every asset with the default engine (abort on first failure).
pub fn correlations_for_assets<T>(
    assets: &[(String, T)],
    reference_table: &PriceTable,
    windows: &[WindowSpec],
) -> Result<AssetCorrelationMap, CorrelationError>
where
    T: Borrow<PriceTable> + Sync,
{
    CorrelationEngine::default()
        .run(assets, reference_table, windows)
        .map(|report| report.correlations)
}
