//! Periodic job definitions.

pub mod token_sweep;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use herp_core::AppError;

pub use token_sweep::TokenSweepJob;

/// A task that runs on a fixed interval.
#[async_trait]
pub trait PeriodicJob: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Time between runs. The first run happens one interval after start.
    fn interval(&self) -> Duration;

    /// Execute once and return a small summary for the log.
    async fn run(&self) -> Result<Value, AppError>;
}
