//! Price history from a directory of CSV exports.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use super::{FeedError, HistoryRequest, PriceHistorySource};
use crate::table::PriceTable;

/// Reads `<root>/<asset>_<frequency>.csv`, falling back to `<root>/<asset>.csv`.
///
/// Characters that are awkward in file names (`:` and `/`) are replaced by
/// `_`, so `INDEX:BTCUSD` daily history lives in `INDEX_BTCUSD_D.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, request: &HistoryRequest) -> [PathBuf; 2] {
        let stem = file_stem(&request.asset);
        [
            self.root
                .join(format!("{stem}_{}.csv", request.frequency.code())),
            self.root.join(format!("{stem}.csv")),
        ]
    }
}

impl PriceHistorySource for CsvDirectorySource {
    fn fetch(&self, request: &HistoryRequest) -> Result<PriceTable, FeedError> {
        let Some(path) = self
            .candidates(request)
            .into_iter()
            .find(|path| path.is_file())
        else {
            return Err(FeedError::NotFound {
                asset: request.asset.clone(),
                frequency: request.frequency,
            });
        };

        let file = File::open(&path).map_err(|source| FeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = PriceTable::from_csv_reader(BufReader::new(file), &request.asset).map_err(
            |source| FeedError::Parse {
                asset: request.asset.clone(),
                source,
            },
        )?;

        let table = match request.since {
            Some(since) => table.filter_rows(|ts| ts.date_naive() >= since),
            None => table,
        };
        let table = table.tail(request.bar_count(Utc::now().date_naive()));

        debug!(
            asset = %request.asset,
            frequency = %request.frequency,
            path = %path.display(),
            rows = table.len(),
            "Loaded price history"
        );

        Ok(table)
    }
}

fn file_stem(asset: &str) -> String {
    asset.replace([':', '/'], "_")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::feed::Frequency;

    const BTC_CSV: &str = "\
datetime,symbol,open,high,low,close,volume
2017-12-30 00:00:00,INDEX:BTCUSD,14000.0,14500.0,12000.0,12500.0,100
2017-12-31 00:00:00,INDEX:BTCUSD,12500.0,14300.0,12400.0,14100.0,120
2018-01-01 00:00:00,INDEX:BTCUSD,14100.0,14200.0,13100.0,13400.0,90
";

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("INDEX:BTCUSD"), "INDEX_BTCUSD");
        assert_eq!(file_stem("FX/EURUSD"), "FX_EURUSD");
    }

    #[test]
    fn test_fetch_prefers_frequency_file_and_filters_since() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("INDEX_BTCUSD_D.csv"), BTC_CSV).unwrap();
        fs::write(dir.path().join("INDEX_BTCUSD.csv"), "date,close\n").unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let request = HistoryRequest::new(
            "INDEX:BTCUSD",
            Frequency::Daily,
            NaiveDate::from_ymd_opt(2017, 12, 31),
        );

        let table = source.fetch(&request).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.column("close").is_some());
    }

    #[test]
    fn test_fetch_falls_back_to_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("TVC_GOLD.csv"), BTC_CSV).unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let request = HistoryRequest::new("TVC:GOLD", Frequency::Weekly, None);
        assert_eq!(source.fetch(&request).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvDirectorySource::new(dir.path());
        let request = HistoryRequest::new("TVC:DXY", Frequency::Monthly, None);

        let Err(err) = source.fetch(&request) else {
            panic!("missing file should fail");
        };
        assert!(matches!(err, FeedError::NotFound { .. }));
        assert!(err.to_string().contains("TVC:DXY (M)"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SPX.csv"), "ticker,close\nSPX,1.0\n").unwrap();

        let source = CsvDirectorySource::new(dir.path());
        let request = HistoryRequest::new("SPX", Frequency::Daily, None);
        assert!(matches!(
            source.fetch(&request),
            Err(FeedError::Parse { .. })
        ));
    }
}
