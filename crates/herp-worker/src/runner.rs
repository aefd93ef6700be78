//! Worker runner: drives periodic jobs until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::jobs::PeriodicJob;

/// Runs every registered job on its own interval.
#[derive(Debug, Default)]
pub struct WorkerRunner {
    jobs: Vec<Arc<dyn PeriodicJob>>,
}

impl WorkerRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job.
    pub fn with_job(mut self, job: Arc<dyn PeriodicJob>) -> Self {
        self.jobs.push(job);
        self
    }

    /// Run until `cancel` becomes `true` or its sender is dropped.
    pub async fn run(&self, cancel: watch::Receiver<bool>) {
        tracing::info!(jobs = self.jobs.len(), "Worker started");

        let mut tasks = JoinSet::new();
        for job in &self.jobs {
            tasks.spawn(drive(Arc::clone(job), cancel.clone()));
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker task panicked");
            }
        }

        tracing::info!("Worker shut down complete");
    }
}

async fn drive(job: Arc<dyn PeriodicJob>, mut cancel: watch::Receiver<bool>) {
    let period = job.interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(job = job.name(), interval_secs = period.as_secs(), "Job scheduled");

    loop {
        if *cancel.borrow() {
            break;
        }
        tokio::select! {
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    tracing::info!(job = job.name(), "Job received shutdown signal");
                    break;
                }
            }
            _ = ticker.tick() => {
                match job.run().await {
                    Ok(summary) => tracing::info!(job = job.name(), %summary, "Job completed"),
                    Err(e) => tracing::error!(job = job.name(), error = %e, "Job failed"),
                }
            }
        }
    }
}
