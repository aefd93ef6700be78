//! Refresh-token persistence over a [`RefreshTokenStore`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use herp_core::error::{AppError, ErrorKind};
use herp_core::traits::Clock;
use herp_database::store::RefreshTokenStore;
use herp_entity::principal::PrincipalRef;
use herp_entity::session::{CreateRefreshToken, RefreshToken};

use super::refresh::RefreshTokenGenerator;

/// A newly persisted refresh token, returned to the caller exactly once.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Creates, looks up, revokes, and sweeps refresh tokens.
///
/// Callers deal in raw tokens; only digests reach the store.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn RefreshTokenStore>,
    generator: RefreshTokenGenerator,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl SessionStore {
    pub fn new(
        store: Arc<dyn RefreshTokenStore>,
        generator: RefreshTokenGenerator,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            generator,
            refresh_ttl,
            clock,
        }
    }

    /// Generate, persist, and return a new refresh token for `principal`.
    pub async fn issue(&self, principal: PrincipalRef) -> Result<IssuedRefreshToken, AppError> {
        let token = self.generator.generate();
        let ttl = chrono::Duration::from_std(self.refresh_ttl).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Refresh TTL too large", e)
        })?;
        let expires_at = self.clock.now() + ttl;
        self.create(principal, &token, expires_at).await?;
        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Persist a caller-supplied token. Fails with `Conflict` on collision.
    pub async fn create(
        &self,
        principal: PrincipalRef,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let row = self
            .store
            .create_refresh_token(CreateRefreshToken {
                principal,
                token_hash: self.generator.digest(token),
                expires_at,
            })
            .await?;
        debug!(principal = %principal, token_id = row.id, "Refresh token stored");
        Ok(row)
    }

    /// Find a usable token. Revoked, expired, and unknown tokens are all
    /// `NotFound`.
    pub async fn lookup(&self, token: &str) -> Result<RefreshToken, AppError> {
        self.store
            .find_active_refresh_token(&self.generator.digest(token), self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Refresh token not found"))
    }

    /// Mark one token revoked. Revoking twice is a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.store
            .revoke_refresh_token(&self.generator.digest(token))
            .await
    }

    /// Revoke every token of `principal`; returns how many were live.
    pub async fn revoke_all(&self, principal: PrincipalRef) -> Result<u64, AppError> {
        let revoked = self.store.revoke_all_refresh_tokens(principal).await?;
        info!(principal = %principal, revoked, "Revoked all refresh tokens");
        Ok(revoked)
    }

    /// Delete rows that are revoked or expired.
    pub async fn sweep(&self) -> Result<u64, AppError> {
        let deleted = self
            .store
            .delete_expired_or_revoked(self.clock.now())
            .await?;
        if deleted > 0 {
            info!(deleted, "Swept refresh tokens");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herp_core::ErrorKind;
    use herp_core::traits::ManualClock;
    use herp_database::MemoryStore;

    fn setup() -> (SessionStore, Arc<MemoryStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let memory = Arc::new(MemoryStore::seeded());
        let store = SessionStore::new(
            memory.clone(),
            RefreshTokenGenerator::new("pepper"),
            Duration::from_secs(3600),
            clock.clone(),
        );
        (store, memory, clock)
    }

    #[tokio::test]
    async fn test_issue_then_lookup() {
        let (store, memory, _) = setup();
        let issued = store.issue(PrincipalRef::user(7)).await.unwrap();
        let row = store.lookup(&issued.token).await.unwrap();
        assert_eq!(row.principal(), PrincipalRef::user(7));
        assert_ne!(memory.refresh_tokens()[0].token_hash, issued.token);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (store, _, _) = setup();
        let err = store.lookup("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_token_conflicts() {
        let (store, _, clock) = setup();
        let expires = clock.now() + chrono::Duration::hours(1);
        store.create(PrincipalRef::user(1), "same", expires).await.unwrap();
        let err = store
            .create(PrincipalRef::user(2), "same", expires)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (store, _, _) = setup();
        let issued = store.issue(PrincipalRef::admin(1)).await.unwrap();
        store.revoke(&issued.token).await.unwrap();
        store.revoke(&issued.token).await.unwrap();
        assert_eq!(
            store.lookup(&issued.token).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_expired_token_not_usable() {
        let (store, _, clock) = setup();
        let issued = store.issue(PrincipalRef::user(3)).await.unwrap();
        clock.advance(Duration::from_secs(3601));
        assert!(store.lookup(&issued.token).await.is_err());
    }

    #[tokio::test]
    async fn test_revoke_all_scopes_to_principal() {
        let (store, _, _) = setup();
        let a1 = store.issue(PrincipalRef::user(1)).await.unwrap();
        let a2 = store.issue(PrincipalRef::user(1)).await.unwrap();
        let admin = store.issue(PrincipalRef::admin(1)).await.unwrap();

        assert_eq!(store.revoke_all(PrincipalRef::user(1)).await.unwrap(), 2);
        assert!(store.lookup(&a1.token).await.is_err());
        assert!(store.lookup(&a2.token).await.is_err());
        assert!(store.lookup(&admin.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_deletes_revoked_and_expired() {
        let (store, memory, clock) = setup();
        let revoked = store.issue(PrincipalRef::user(1)).await.unwrap();
        store.revoke(&revoked.token).await.unwrap();
        store
            .create(
                PrincipalRef::user(2),
                "short",
                clock.now() + chrono::Duration::seconds(10),
            )
            .await
            .unwrap();
        let live = store.issue(PrincipalRef::user(3)).await.unwrap();
        clock.advance(Duration::from_secs(60));

        assert_eq!(store.sweep().await.unwrap(), 2);
        assert_eq!(memory.refresh_tokens().len(), 1);
        assert!(store.lookup(&live.token).await.is_ok());
        assert_eq!(store.sweep().await.unwrap(), 0);
    }
}
