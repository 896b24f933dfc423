//! Error handling for the correlation engine.
//!
//! Validation failures are raised immediately and never caught inside the
//! engine. Numeric degeneracy (zero-variance windows, mismatched window
//! lengths) is not an error: it surfaces as a `NaN` correlation.
//!
//! | Kind | Variants | Meaning |
//! |------|----------|---------|
//! | `InputShape` | `InvalidTable` | Input is not a well-formed price table |
//! | `ContentValidation` | `NoPriceColumn` | Table has no usable price column |
//! | `Configuration` | `InvalidWindow`, `ThreadPool` | Caller-supplied settings are unusable |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Wrong kind of input where a price table was expected.
    InputShape,
    /// Table is well-formed but carries no usable price data.
    ContentValidation,
    /// Caller configuration is invalid.
    Configuration,
}

impl ErrorKind {
    /// Stable reason string for logs and serialized reports.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InputShape => "INPUT_SHAPE",
            Self::ContentValidation => "CONTENT_VALIDATION",
            Self::Configuration => "CONFIGURATION",
        }
    }
}

/// Errors raised by the correlation engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// The input is not a valid price table.
    #[error("Expected {name} to be a valid price table: {reason}")]
    InvalidTable {
        /// Label of the offending input.
        name: String,
        /// What is wrong with its shape.
        reason: String,
    },

    /// No `close`, `Close`, or numeric column exists.
    #[error("{name} must contain a 'close', 'Close', or at least one numeric column")]
    NoPriceColumn {
        /// Label of the offending input.
        name: String,
    },

    /// A window size of zero was requested.
    #[error("Window size must be a positive integer, got {value}")]
    InvalidWindow {
        /// The rejected window size.
        value: usize,
    },

    /// The worker pool could not be configured.
    #[error("Failed to initialize thread pool: {message}")]
    ThreadPool {
        /// Error message.
        message: String,
    },
}

impl CorrelationError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTable { .. } => ErrorKind::InputShape,
            Self::NoPriceColumn { .. } => ErrorKind::ContentValidation,
            Self::InvalidWindow { .. } | Self::ThreadPool { .. } => ErrorKind::Configuration,
        }
    }

    /// Label of the input that failed validation, if any.
    #[must_use]
    pub fn input_name(&self) -> Option<&str> {
        match self {
            Self::InvalidTable { name, .. } | Self::NoPriceColumn { name } => Some(name),
            Self::InvalidWindow { .. } | Self::ThreadPool { .. } => None,
        }
    }

    pub(crate) fn invalid_table(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
