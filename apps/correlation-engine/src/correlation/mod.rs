//! Fixed-window correlation of assets against a reference asset.
//!
//! - [`windowed_correlation`]: Pearson correlation over the last N observations
//! - [`correlations_for_asset`]: one asset across several windows
//! - [`CorrelationEngine`] / [`correlations_for_assets`]: every asset in a collection
//!
//! Degenerate windows produce `NaN` rather than an error so that charts can
//! render them as gaps.

mod aggregate;
mod config;
mod engine;
pub mod math;
mod window;

pub use aggregate::{CorrelationMap, correlations_for_asset};
pub use config::{EngineConfig, FailurePolicy, ParallelConfig};
pub use engine::{
    AssetCorrelationMap, AssetFailure, CorrelationEngine, CorrelationReport,
    correlations_for_assets,
};
pub use window::{WindowSpec, windowed_correlation};
