//! Refresh-token sweep.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use herp_auth::session::SessionStore;
use herp_core::AppError;

use super::PeriodicJob;

/// Deletes revoked and expired refresh-token rows.
#[derive(Debug, Clone)]
pub struct TokenSweepJob {
    sessions: SessionStore,
    interval: Duration,
}

impl TokenSweepJob {
    pub fn new(sessions: SessionStore, interval: Duration) -> Self {
        Self { sessions, interval }
    }
}

#[async_trait]
impl PeriodicJob for TokenSweepJob {
    fn name(&self) -> &'static str {
        "token_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<Value, AppError> {
        let deleted = self.sessions.sweep().await?;
        Ok(serde_json::json!({ "deleted": deleted }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use herp_auth::session::RefreshTokenGenerator;
    use herp_core::traits::ManualClock;
    use herp_database::MemoryStore;
    use herp_entity::principal::PrincipalRef;

    use super::*;

    #[tokio::test]
    async fn test_sweep_reports_deleted_rows() {
        let clock = Arc::new(ManualClock::starting_now());
        let memory = Arc::new(MemoryStore::seeded());
        let sessions = SessionStore::new(
            memory.clone(),
            RefreshTokenGenerator::new("pepper"),
            Duration::from_secs(60),
            clock.clone(),
        );
        let old = sessions.issue(PrincipalRef::user(1)).await.unwrap();
        sessions.revoke(&old.token).await.unwrap();
        sessions.issue(PrincipalRef::user(2)).await.unwrap();

        let job = TokenSweepJob::new(sessions, Duration::from_secs(3600));
        let summary = job.run().await.unwrap();
        assert_eq!(summary["deleted"], 1);
        assert_eq!(memory.refresh_tokens().len(), 1);

        clock.advance(Duration::from_secs(61));
        let summary = job.run().await.unwrap();
        assert_eq!(summary["deleted"], 1);
        assert!(memory.refresh_tokens().is_empty());
    }
}
