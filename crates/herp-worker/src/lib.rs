//! Scheduled maintenance tasks for Herp.
//!
//! The [`WorkerRunner`] drives every registered [`PeriodicJob`] on its own
//! interval until the shutdown signal flips to `true`.

pub mod jobs;
pub mod runner;

pub use jobs::{PeriodicJob, TokenSweepJob};
pub use runner::WorkerRunner;
