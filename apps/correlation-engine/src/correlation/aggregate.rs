//! Per-asset aggregation across window sizes.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::window::{WindowSpec, windowed_correlation};
use crate::error::CorrelationError;
use crate::series::{PriceSeries, extract_labeled, validate_price_table};
use crate::table::PriceTable;

/// Correlation per window size for one asset.
///
/// Keys keep request order. Inserting an existing window overwrites its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMap {
    entries: Vec<(WindowSpec, f64)>,
}

impl CorrelationMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite the correlation for `window`.
    pub fn insert(&mut self, window: WindowSpec, correlation: f64) {
        match self.entries.iter_mut().find(|(w, _)| *w == window) {
            Some(entry) => entry.1 = correlation,
            None => self.entries.push((window, correlation)),
        }
    }

    /// Correlation for `window`, if it was requested.
    #[must_use]
    pub fn get(&self, window: WindowSpec) -> Option<f64> {
        self.entries
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, c)| *c)
    }

    /// Correlation for a raw window size.
    #[must_use]
    pub fn get_size(&self, size: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|(w, _)| w.get() == size)
            .map(|(_, c)| *c)
    }

    /// Windows in request order.
    pub fn windows(&self) -> impl Iterator<Item = WindowSpec> + '_ {
        self.entries.iter().map(|(w, _)| *w)
    }

    /// `(window, correlation)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (WindowSpec, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of distinct windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no windows were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CorrelationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (window, correlation) in &self.entries {
            map.serialize_entry(window, correlation)?;
        }
        map.end()
    }
}

/// Correlate one asset against the reference for every requested window.
///
/// Both tables are validated before any computation; a validation failure
/// aborts the call.
pub fn correlations_for_asset(
    asset_table: &PriceTable,
    reference_table: &PriceTable,
    windows: &[WindowSpec],
) -> Result<CorrelationMap, CorrelationError> {
    validate_price_table(asset_table, "asset_table")?;
    validate_price_table(reference_table, "reference_table")?;

    let asset = extract_labeled(asset_table, "asset_table")?;
    let reference = extract_labeled(reference_table, "reference_table")?;

    Ok(correlate_series(&asset, &reference, windows))
}

/// Window sweep over already-extracted series.
pub(crate) fn correlate_series(
    asset: &PriceSeries<'_>,
    reference: &PriceSeries<'_>,
    windows: &[WindowSpec],
) -> CorrelationMap {
    let mut correlations = CorrelationMap::new();
    for &window in windows {
        let correlation = windowed_correlation(asset, reference, window);
        debug!(
            window = window.get(),
            correlation,
            asset_column = asset.name(),
            "Window correlation computed"
        );
        correlations.insert(window, correlation);
    }
    correlations
}
