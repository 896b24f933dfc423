//! Ordered extraction strategies and table validation.
//!
//! Priority: a `close` column, then a `Close` column, then the first numeric
//! column in declared order. Each strategy is tried in turn and the first
//! one that yields a series wins.

use std::borrow::Cow;

use tracing::trace;

use super::PriceSeries;
use crate::error::CorrelationError;
use crate::table::{Column, ColumnValues, PriceTable};

/// A pure extraction strategy.
pub type ExtractionStrategy = for<'a> fn(&'a PriceTable) -> Option<PriceSeries<'a>>;

/// Strategies in priority order.
pub const EXTRACTION_STRATEGIES: [(&str, ExtractionStrategy); 3] = [
    ("lowercase_close", lowercase_close),
    ("capitalized_close", capitalized_close),
    ("first_numeric_column", first_numeric_column),
];

/// Use a column named exactly `close`.
pub fn lowercase_close(table: &PriceTable) -> Option<PriceSeries<'_>> {
    table.column("close").and_then(|c| series_from(table, c))
}

/// Use a column named exactly `Close`.
pub fn capitalized_close(table: &PriceTable) -> Option<PriceSeries<'_>> {
    table.column("Close").and_then(|c| series_from(table, c))
}

/// Use the first column whose values are all numeric.
pub fn first_numeric_column(table: &PriceTable) -> Option<PriceSeries<'_>> {
    table.columns().iter().find_map(|c| series_from(table, c))
}

fn series_from<'a>(table: &'a PriceTable, column: &'a Column) -> Option<PriceSeries<'a>> {
    let values = match column.values() {
        ColumnValues::Float(v) => Cow::Borrowed(v.as_slice()),
        ColumnValues::Int(v) => Cow::Owned(v.iter().map(|&x| x as f64).collect()),
        ColumnValues::Text(_) => return None,
    };
    Some(PriceSeries::new(column.name(), table.index(), values))
}

fn first_match(table: &PriceTable) -> Option<PriceSeries<'_>> {
    EXTRACTION_STRATEGIES.iter().find_map(|(strategy, extract)| {
        let series = extract(table)?;
        trace!(strategy, column = series.name(), "Price column selected");
        Some(series)
    })
}

/// Check that `table` is a usable price table without extracting.
///
/// `name` labels the input in the returned error.
pub fn validate_price_table(table: &PriceTable, name: &str) -> Result<(), CorrelationError> {
    table
        .check_shape()
        .map_err(|reason| CorrelationError::invalid_table(name, reason))?;

    if EXTRACTION_STRATEGIES
        .iter()
        .all(|(_, extract)| extract(table).is_none())
    {
        return Err(CorrelationError::NoPriceColumn {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Validate and extract the canonical price series of `table`.
pub fn extract_price_series(table: &PriceTable) -> Result<PriceSeries<'_>, CorrelationError> {
    extract_labeled(table, "table")
}

/// Like [`extract_price_series`], labelling errors with `name`.
pub fn extract_labeled<'a>(
    table: &'a PriceTable,
    name: &str,
) -> Result<PriceSeries<'a>, CorrelationError> {
    validate_price_table(table, name)?;
    first_match(table).ok_or_else(|| CorrelationError::NoPriceColumn {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use test_case::test_case;

    use super::*;
    use crate::error::ErrorKind;
    use crate::table::Timestamp;

    fn days(n: usize) -> Vec<Timestamp> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn ohlc(close_name: &str) -> PriceTable {
        PriceTable::new(days(3))
            .with_column("open", vec![1.0, 2.0, 3.0])
            .with_column(close_name, vec![10.0, 20.0, 30.0])
    }

    #[test_case("close" ; "lowercase")]
    #[test_case("Close" ; "capitalized")]
    fn test_named_close_column_wins_over_earlier_numeric(name: &str) {
        let table = ohlc(name);
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.name(), name);
        assert_eq!(series.values(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_lowercase_beats_capitalized() {
        let table = PriceTable::new(days(2))
            .with_column("Close", vec![1.0, 2.0])
            .with_column("close", vec![3.0, 4.0]);
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.name(), "close");
        assert_eq!(series.values(), &[3.0, 4.0]);
    }

    #[test]
    fn test_fallback_to_first_numeric_column() {
        let table = PriceTable::new(days(2))
            .with_column("label", vec!["a", "b"])
            .with_column("price", vec![5.0, 6.0])
            .with_column("start", vec![7.0, 8.0]);
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.name(), "price");
    }

    #[test]
    fn test_integer_column_is_widened() {
        let table = PriceTable::new(days(3)).with_column("volume", vec![1_i64, 2, 3]);
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_text_close_column_falls_through() {
        let table = PriceTable::new(days(2))
            .with_column("close", vec!["n/a", "n/a"])
            .with_column("last", vec![1.0, 2.0]);
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.name(), "last");
    }

    #[test]
    fn test_series_shares_table_index() {
        let table = ohlc("close");
        let series = extract_price_series(&table).unwrap();
        assert_eq!(series.index(), table.index());
        assert_eq!(series.len(), table.len());
        assert!(std::ptr::eq(series.index(), table.index()));
    }

    #[test]
    fn test_non_numeric_table_fails_content_validation() {
        let index = days(2);
        let dates: Vec<String> = index.iter().map(|d| d.to_string()).collect();
        let table = PriceTable::new(index)
            .with_column("date", dates)
            .with_column("status", vec!["active", "active"]);

        let Err(err) = validate_price_table(&table, "asset_table") else {
            panic!("non-numeric table should fail validation");
        };
        assert_eq!(err.kind(), ErrorKind::ContentValidation);
        assert_eq!(err.input_name(), Some("asset_table"));
        assert!(extract_price_series(&table).is_err());
    }

    #[test]
    fn test_malformed_table_fails_shape_validation() {
        let table = PriceTable::new(days(3)).with_column("close", vec![1.0]);
        let Err(err) = validate_price_table(&table, "reference_table") else {
            panic!("malformed table should fail validation");
        };
        assert_eq!(err.kind(), ErrorKind::InputShape);
        assert_eq!(err.input_name(), Some("reference_table"));
    }

    #[test]
    fn test_strategies_are_independent() {
        let table = PriceTable::new(days(1)).with_column("price", vec![1.0]);
        assert!(lowercase_close(&table).is_none());
        assert!(capitalized_close(&table).is_none());
        assert!(first_numeric_column(&table).is_some());
    }
}
