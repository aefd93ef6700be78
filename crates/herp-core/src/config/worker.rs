//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background task configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether background tasks run in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between refresh-token sweeps, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub token_sweep_interval_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token_sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    3600
}
