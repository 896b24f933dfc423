//! Fixed-window correlation between two price series.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::math::pearson;
use crate::error::CorrelationError;
use crate::series::PriceSeries;

/// Number of most-recent observations used for one correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowSpec(NonZeroUsize);

impl WindowSpec {
    /// Create a window of `size` observations.
    pub fn new(size: usize) -> Result<Self, CorrelationError> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or(CorrelationError::InvalidWindow { value: size })
    }

    /// Build a list of windows, rejecting the first zero.
    pub fn list(sizes: &[usize]) -> Result<Vec<Self>, CorrelationError> {
        sizes.iter().map(|&size| Self::new(size)).collect()
    }

    /// Window size.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl From<NonZeroUsize> for WindowSpec {
    fn from(size: NonZeroUsize) -> Self {
        Self(size)
    }
}

impl TryFrom<usize> for WindowSpec {
    type Error = CorrelationError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for WindowSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.get() as u64)
    }
}

impl<'de> Deserialize<'de> for WindowSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let size = usize::deserialize(deserializer)?;
        Self::new(size).map_err(serde::de::Error::custom)
    }
}

/// Pearson correlation of the last `window` observations of each series.
///
/// Each series is tail-sliced independently from its own end, and the two
/// slices are paired by position, not by timestamp. A window longer than a
/// series covers the whole series. Degenerate windows yield `NaN`.
pub fn windowed_correlation(
    asset_series: &PriceSeries<'_>,
    reference_series: &PriceSeries<'_>,
    window: WindowSpec,
) -> f64 {
    pearson(
        asset_series.tail(window.get()),
        reference_series.tail(window.get()),
    )
}
