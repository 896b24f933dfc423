//! Canonical price series extraction.
//!
//! A [`PriceSeries`] is a read-only view of one numeric column of a
//! [`PriceTable`](crate::table::PriceTable). It borrows the table's index
//! and, for float columns, its values; integer columns are widened once
//! at extraction time.

mod extract;

use std::borrow::Cow;

use crate::table::Timestamp;

pub use extract::{
    EXTRACTION_STRATEGIES, ExtractionStrategy, capitalized_close, extract_labeled,
    extract_price_series, first_numeric_column, lowercase_close, validate_price_table,
};

/// Time-ordered prices derived from a single table column.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries<'a> {
    name: &'a str,
    index: &'a [Timestamp],
    values: Cow<'a, [f64]>,
}

impl<'a> PriceSeries<'a> {
    pub(crate) const fn new(name: &'a str, index: &'a [Timestamp], values: Cow<'a, [f64]>) -> Self {
        Self {
            name,
            index,
            values,
        }
    }

    /// Name of the source column.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Timestamps, shared with the source table.
    #[must_use]
    pub const fn index(&self) -> &'a [Timestamp] {
        self.index
    }

    /// Price values in index order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Timestamp, f64)> + '_ {
        self.index.iter().zip(self.values.iter().copied())
    }

    /// The last `n` values, or all of them when the series is shorter.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }
}
