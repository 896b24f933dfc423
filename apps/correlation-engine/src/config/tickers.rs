//! Ticker entries.

use serde::{Deserialize, Serialize};

use crate::feed::Frequency;

/// Reference asset used when the config does not name one.
pub const DEFAULT_REFERENCE_SYMBOL: &str = "INDEX:BTCUSD";

/// One asset to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTicker {
    /// Asset identifier, e.g. `TVC:GOLD`.
    #[serde(rename = "ticker", default)]
    pub symbol: String,
    /// Bar frequency, `D`, `W` or `M`.
    #[serde(default)]
    pub frequency: Frequency,
}

impl MacroTicker {
    /// Create a ticker entry.
    #[must_use]
    pub fn new(symbol: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            symbol: symbol.into(),
            frequency,
        }
    }

    /// Daily Bitcoin index.
    #[must_use]
    pub fn reference() -> Self {
        Self::new(DEFAULT_REFERENCE_SYMBOL, Frequency::Daily)
    }
}
