//! Tabular price data as handed over by the retrieval layer.
//!
//! A [`PriceTable`] is a time-indexed table with one or more named columns.
//! Columns keep their declared order, which matters for the first-numeric
//! column fallback during series extraction.

mod ingest;

use chrono::{DateTime, Utc};

/// Observation timestamp.
pub type Timestamp = DateTime<Utc>;

/// Typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Floating point values. Missing cells are `NaN`.
    Float(Vec<f64>),
    /// Integer values.
    Int(Vec<i64>),
    /// Anything that is not numeric.
    Text(Vec<String>),
}

impl ColumnValues {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Whether the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every value is floating point or integer.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Float(_) | Self::Int(_))
    }

    /// Short dtype label used in log output.
    #[must_use]
    pub const fn dtype(&self) -> &'static str {
        match self {
            Self::Float(_) => "float64",
            Self::Int(_) => "int64",
            Self::Text(_) => "object",
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Self::Float(v) => Self::Float(rows.iter().map(|&i| v[i]).collect()),
            Self::Int(v) => Self::Int(rows.iter().map(|&i| v[i]).collect()),
            Self::Text(v) => Self::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

impl From<Vec<f64>> for ColumnValues {
    fn from(values: Vec<f64>) -> Self {
        Self::Float(values)
    }
}

impl From<Vec<i64>> for ColumnValues {
    fn from(values: Vec<i64>) -> Self {
        Self::Int(values)
    }
}

impl From<Vec<String>> for ColumnValues {
    fn from(values: Vec<String>) -> Self {
        Self::Text(values)
    }
}

impl From<Vec<&str>> for ColumnValues {
    fn from(values: Vec<&str>) -> Self {
        Self::Text(values.into_iter().map(str::to_string).collect())
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Column label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column cells.
    #[must_use]
    pub const fn values(&self) -> &ColumnValues {
        &self.values
    }
}

/// Time-indexed price table.
///
/// Construction is unchecked so that callers can hand over whatever the
/// data source produced; [`PriceTable::check_shape`] reports structural
/// problems and is run by series validation before any numeric work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl PriceTable {
    /// Create a table with the given index and no columns.
    #[must_use]
    pub const fn new(index: Vec<Timestamp>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Append a column.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, values: impl Into<ColumnValues>) -> Self {
        self.columns.push(Column {
            name: name.into(),
            values: values.into(),
        });
        self
    }

    /// Row timestamps.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// Columns in declared order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check structural consistency.
    ///
    /// Returns a description of the first problem found: a column whose
    /// length differs from the index, or a duplicated column name.
    pub fn check_shape(&self) -> Result<(), String> {
        for (pos, column) in self.columns.iter().enumerate() {
            if column.values.len() != self.index.len() {
                return Err(format!(
                    "column '{}' has {} values but the index has {} rows",
                    column.name,
                    column.values.len(),
                    self.index.len()
                ));
            }
            if self.columns[..pos].iter().any(|c| c.name == column.name) {
                return Err(format!("duplicate column '{}'", column.name));
            }
        }
        Ok(())
    }

    /// Keep only rows whose timestamp satisfies `keep`.
    #[must_use]
    pub fn filter_rows(&self, keep: impl Fn(&Timestamp) -> bool) -> Self {
        let rows: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, ts)| keep(ts))
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }

    /// Keep the last `n` rows.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let start = self.index.len().saturating_sub(n);
        let rows: Vec<usize> = (start..self.index.len()).collect();
        self.select_rows(&rows)
    }

    fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            columns: self
                .columns
                .iter()
                .filter(|c| c.values.len() == self.index.len())
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values.select(rows),
                })
                .collect(),
        }
    }
}
