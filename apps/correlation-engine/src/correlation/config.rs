//! Configuration for multi-asset correlation runs.

use serde::{Deserialize, Serialize};

/// What to do when one asset's table fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Propagate the first failure in input order and return nothing else.
    #[default]
    Abort,
    /// Leave the asset out of the result and report it separately.
    Skip,
}

/// Worker pool settings for per-asset work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Maximum number of threads to use (0 = use all available).
    pub max_threads: usize,

    /// Minimum parallelization threshold (asset counts below this run sequentially).
    pub min_parallel_assets: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            min_parallel_assets: 8,
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-asset validation failure handling.
    pub failure_policy: FailurePolicy,
    /// Worker pool settings.
    pub parallel: ParallelConfig,
}
