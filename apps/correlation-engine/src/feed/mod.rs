//! Price history retrieval.
//!
//! The engine never performs I/O itself. Price tables are fetched up front
//! through a [`PriceHistorySource`] and handed to the engine afterwards.

mod cache;
mod csv_source;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CorrelationError;
use crate::table::PriceTable;

pub use cache::CachedPriceSource;
pub use csv_source::CsvDirectorySource;

/// Number of most recent bars kept when no start date is requested.
pub const DEFAULT_BAR_COUNT: usize = 2000;

/// Sampling frequency of a price history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// One bar per day.
    #[default]
    #[serde(rename = "D")]
    Daily,
    /// One bar per week.
    #[serde(rename = "W")]
    Weekly,
    /// One bar per month.
    #[serde(rename = "M")]
    Monthly,
}

impl Frequency {
    /// Parse a single-letter frequency code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "D" => Some(Self::Daily),
            "W" => Some(Self::Weekly),
            "M" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Single-letter frequency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Monthly => "M",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What to fetch. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryRequest {
    /// Asset identifier, e.g. `INDEX:BTCUSD`.
    pub asset: String,
    /// Bar frequency.
    pub frequency: Frequency,
    /// First date to include.
    pub since: Option<NaiveDate>,
}

impl HistoryRequest {
    /// Create a request.
    #[must_use]
    pub fn new(asset: impl Into<String>, frequency: Frequency, since: Option<NaiveDate>) -> Self {
        Self {
            asset: asset.into(),
            frequency,
            since,
        }
    }

    /// Number of most recent bars to keep as of `today`.
    ///
    /// Days elapsed since `since`, or [`DEFAULT_BAR_COUNT`] when no start
    /// date is set. A start date in the future yields zero.
    #[must_use]
    pub fn bar_count(&self, today: NaiveDate) -> usize {
        self.since.map_or(DEFAULT_BAR_COUNT, |since| {
            usize::try_from((today - since).num_days()).unwrap_or(0)
        })
    }
}

/// Price history errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The source has nothing for this asset.
    #[error("No price history found for {asset} ({frequency})")]
    NotFound {
        /// Asset identifier.
        asset: String,
        /// Requested frequency.
        frequency: Frequency,
    },

    /// Reading the underlying data failed.
    #[error("Failed to read price history '{path}': {source}")]
    Io {
        /// Location that failed.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The data could not be turned into a price table.
    #[error("Invalid price history for {asset}: {source}")]
    Parse {
        /// Asset identifier.
        asset: String,
        /// The underlying table error.
        source: CorrelationError,
    },
}

/// Source of price tables (driven port).
pub trait PriceHistorySource: Send + Sync {
    /// Fetch the price table described by `request`.
    fn fetch(&self, request: &HistoryRequest) -> Result<PriceTable, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_codes() {
        assert_eq!(Frequency::from_code("D"), Some(Frequency::Daily));
        assert_eq!(Frequency::from_code("W"), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_code("M"), Some(Frequency::Monthly));
        assert_eq!(Frequency::from_code("H"), None);
        assert_eq!(Frequency::Weekly.to_string(), "W");
    }

    #[test]
    fn test_frequency_yaml() {
        let Ok(freq) = serde_yaml_bw::from_str::<Frequency>("M") else {
            panic!("frequency code should parse");
        };
        assert_eq!(freq, Frequency::Monthly);
        assert!(serde_yaml_bw::from_str::<Frequency>("Q").is_err());
    }

    #[test]
    fn test_bar_count() {
        let today = NaiveDate::from_ymd_opt(2018, 1, 30).unwrap();
        let since = NaiveDate::from_ymd_opt(2017, 12, 31);

        let request = HistoryRequest::new("INDEX:BTCUSD", Frequency::Daily, since);
        assert_eq!(request.bar_count(today), 30);

        let request = HistoryRequest::new("INDEX:BTCUSD", Frequency::Daily, None);
        assert_eq!(request.bar_count(today), DEFAULT_BAR_COUNT);

        let request = HistoryRequest::new("INDEX:BTCUSD", Frequency::Daily, Some(today));
        let yesterday = NaiveDate::from_ymd_opt(2018, 1, 29).unwrap();
        assert_eq!(request.bar_count(yesterday), 0);
    }
}
