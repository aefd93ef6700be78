//! Brute-force protection for the login endpoint.
//!
//! Two windows are kept per attempt: one for the login identifier and one
//! for the client IP. Reaching either limit places a block on that key for
//! the configured block duration.

use tracing::warn;

use herp_cache::keys;
use herp_core::config::RateLimitConfig;
use herp_core::error::AppError;

use super::limiter::RateLimiter;

/// Login-attempt policy over a [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    limiter: RateLimiter,
    config: RateLimitConfig,
}

impl LoginThrottle {
    pub fn new(limiter: RateLimiter, config: RateLimitConfig) -> Self {
        Self { limiter, config }
    }

    fn scopes(&self, identifier: &str, ip: Option<&str>) -> Vec<(String, u32)> {
        let mut scopes = vec![(
            keys::login_attempts_identifier(identifier),
            self.config.login_limit,
        )];
        if let Some(ip) = ip {
            scopes.push((keys::login_attempts_ip(ip), self.config.ip_limit));
        }
        scopes
    }

    /// Reject the attempt if the identifier or the IP is blocked or has
    /// used up its window. Runs before any credential lookup.
    pub async fn gate(&self, identifier: &str, ip: Option<&str>) -> Result<(), AppError> {
        let window = self.config.login_window();
        for (key, limit) in self.scopes(identifier, ip) {
            if let Some(remaining) = self.limiter.blocked_for(&key).await? {
                return Err(AppError::rate_limited(remaining));
            }
            let status = self.limiter.check(&key, limit, window).await?;
            if status.exceeded {
                let block = self.config.block_duration();
                self.limiter.block_key(&key, block).await?;
                return Err(AppError::rate_limited(block));
            }
        }
        Ok(())
    }

    /// Count a failed attempt against both scopes, blocking any scope that
    /// has now reached its limit.
    pub async fn record_failure(&self, identifier: &str, ip: Option<&str>) -> Result<(), AppError> {
        let window = self.config.login_window();
        for (key, limit) in self.scopes(identifier, ip) {
            self.limiter.increment(&key, window).await?;
            let status = self.limiter.check(&key, limit, window).await?;
            if status.exceeded {
                warn!(
                    key = %key,
                    attempts = status.count,
                    "Login limit reached, blocking"
                );
                self.limiter
                    .block_key(&key, self.config.block_duration())
                    .await?;
            }
        }
        Ok(())
    }

    /// Forgive earlier failures for `identifier` after a successful login.
    pub async fn record_success(&self, identifier: &str) -> Result<(), AppError> {
        self.limiter
            .reset(&keys::login_attempts_identifier(identifier))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use herp_cache::CacheManager;
    use herp_cache::memory::MemoryCacheProvider;
    use herp_core::ErrorKind;
    use herp_core::config::MemoryCacheConfig;
    use herp_core::traits::ManualClock;

    fn throttle(config: RateLimitConfig) -> (LoginThrottle, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default(), clock.clone());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));
        let limiter = RateLimiter::new(cache, clock.clone());
        (LoginThrottle::new(limiter, config), clock)
    }

    #[tokio::test]
    async fn test_blocks_after_limit() {
        let (throttle, _) = throttle(RateLimitConfig::default());
        for _ in 0..5 {
            throttle.gate("admin@hotel.com", Some("1.2.3.4")).await.unwrap();
            throttle
                .record_failure("admin@hotel.com", Some("1.2.3.4"))
                .await
                .unwrap();
        }
        let err = throttle
            .gate("ADMIN@hotel.com", Some("5.6.7.8"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(30 * 60)));
    }

    #[tokio::test]
    async fn test_block_outlives_window() {
        let config = RateLimitConfig {
            login_limit: 2,
            login_window_minutes: 1,
            block_duration_minutes: 10,
            ..RateLimitConfig::default()
        };
        let (throttle, clock) = throttle(config);
        throttle.record_failure("bob", None).await.unwrap();
        throttle.record_failure("bob", None).await.unwrap();

        clock.advance(Duration::from_secs(5 * 60));
        let err = throttle.gate("bob", None).await.unwrap_err();
        assert_eq!(err.retry_after, Some(Duration::from_secs(5 * 60)));

        clock.advance(Duration::from_secs(5 * 60 + 1));
        throttle.gate("bob", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_success_forgives_identifier() {
        let (throttle, _) = throttle(RateLimitConfig::default());
        for _ in 0..4 {
            throttle.record_failure("alice", None).await.unwrap();
        }
        throttle.record_success("alice").await.unwrap();
        for _ in 0..4 {
            throttle.record_failure("alice", None).await.unwrap();
        }
        throttle.gate("alice", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_ip_limit_applies_across_identifiers() {
        let config = RateLimitConfig {
            ip_limit: 3,
            ..RateLimitConfig::default()
        };
        let (throttle, _) = throttle(config);
        for name in ["a", "b", "c"] {
            throttle.record_failure(name, Some("9.9.9.9")).await.unwrap();
        }
        let err = throttle.gate("d", Some("9.9.9.9")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        throttle.gate("d", Some("8.8.8.8")).await.unwrap();
    }
}
