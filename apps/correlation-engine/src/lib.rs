// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::items_after_statements
    )
)]

//! Correlation Engine - Rust Core Library
//!
//! Measures how closely a set of assets moves with a reference asset
//! (Bitcoin by default) over several trailing look-back windows.
//!
//! # Pipeline
//!
//! - **Tables**: `table` holds timestamp-indexed price tables, built in code or read from CSV
//! - **Series**: `series` picks the canonical close-price column out of a table
//! - **Correlation**: `correlation` computes windowed Pearson correlation and
//!   aggregates it per asset and across the asset universe
//! - **Feed**: `feed` fetches tables through a port with an explicit cache
//! - **Chart**: `chart` turns results into serializable line series
//!
//! The engine itself performs no I/O. Degenerate windows yield `NaN`, malformed
//! inputs yield a [`CorrelationError`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Chart-ready presentation data.
pub mod chart;

/// YAML configuration.
pub mod config;

/// Windowed correlation, per-asset aggregation and orchestration.
pub mod correlation;

/// Error types.
pub mod error;

/// Price history retrieval.
pub mod feed;

/// Canonical price series extraction.
pub mod series;

/// Timestamp-indexed price tables.
pub mod table;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use correlation::{
    AssetCorrelationMap, CorrelationEngine, CorrelationMap, CorrelationReport, EngineConfig,
    FailurePolicy, WindowSpec, correlations_for_asset, correlations_for_assets,
    windowed_correlation,
};
pub use error::{CorrelationError, ErrorKind};
pub use series::{PriceSeries, extract_price_series, validate_price_table};
pub use table::{PriceTable, Timestamp};
