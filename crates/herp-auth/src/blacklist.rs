//! Logged-out access tokens.
//!
//! Entries are keyed by the token's SHA-256 digest and expire exactly when
//! the token would stop verifying anyway, so the set never grows unbounded.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;

use herp_cache::CacheManager;
use herp_cache::keys;
use herp_core::error::AppError;
use herp_core::traits::CacheProvider;

const SENTINEL: &str = "1";

/// Access-token deny-list backed by the shared cache.
#[derive(Debug, Clone)]
pub struct Blacklist {
    cache: Arc<CacheManager>,
}

impl Blacklist {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Deny `token` for `ttl`. A zero TTL is a no-op.
    pub async fn block(&self, token: &str, ttl: Duration) -> Result<(), AppError> {
        if ttl.is_zero() {
            return Ok(());
        }
        let key = Self::key(token);
        self.cache.set(&key, SENTINEL, ttl).await?;
        debug!(ttl_secs = ttl.as_secs(), "Access token blacklisted");
        Ok(())
    }

    /// Whether `token` has been logged out and not yet expired.
    pub async fn is_blocked(&self, token: &str) -> Result<bool, AppError> {
        self.cache.exists(&Self::key(token)).await
    }

    fn key(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        keys::jwt_blacklist(&hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herp_cache::memory::MemoryCacheProvider;
    use herp_core::config::MemoryCacheConfig;
    use herp_core::traits::ManualClock;

    fn blacklist() -> (Blacklist, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default(), clock.clone());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));
        (Blacklist::new(cache), clock)
    }

    #[tokio::test]
    async fn test_block_then_check() {
        let (blacklist, _) = blacklist();
        assert!(!blacklist.is_blocked("tok").await.unwrap());
        blacklist.block("tok", Duration::from_secs(60)).await.unwrap();
        assert!(blacklist.is_blocked("tok").await.unwrap());
        assert!(!blacklist.is_blocked("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires_with_ttl() {
        let (blacklist, clock) = blacklist();
        blacklist.block("tok", Duration::from_secs(60)).await.unwrap();
        clock.advance(Duration::from_secs(59));
        assert!(blacklist.is_blocked("tok").await.unwrap());
        clock.advance(Duration::from_secs(2));
        assert!(!blacklist.is_blocked("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_not_stored() {
        let (blacklist, _) = blacklist();
        blacklist.block("tok", Duration::ZERO).await.unwrap();
        assert!(!blacklist.is_blocked("tok").await.unwrap());
    }
}
