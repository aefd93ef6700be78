//! Sliding-window counters with a separate escalation block.
//!
//! Each window is a scored set of attempt timestamps in the shared cache.
//! Trimming and counting happen in one atomic cache operation, as do the
//! add and the TTL refresh, so concurrent processes never race on a
//! read-modify-write.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use herp_cache::CacheManager;
use herp_cache::keys;
use herp_core::error::AppError;
use herp_core::traits::{CacheProvider, Clock};

/// Extra lifetime on a window key beyond the window itself, so abandoned
/// keys clean themselves up.
const WINDOW_TTL_MARGIN: Duration = Duration::from_secs(60);

/// Result of a window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether `count` has reached the limit.
    pub exceeded: bool,
    /// Attempts currently inside the window.
    pub count: u64,
    pub limit: u64,
    /// Time until the oldest attempt leaves the window.
    pub reset_in: Duration,
}

impl RateLimitStatus {
    /// Attempts left before the limit is reached.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }
}

/// Cache-backed sliding-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cache: Arc<CacheManager>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(cache: Arc<CacheManager>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }

    /// Trim the window and compare the remaining count with `limit`.
    pub async fn check(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitStatus, AppError> {
        let now_ms = self.clock.unix_millis();
        let window_ms = window.as_millis() as i64;
        let current = self.cache.window_count(key, now_ms - window_ms).await?;

        let reset_in = current
            .oldest_ms
            .map(|oldest| oldest + window_ms - now_ms)
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms as u64))
            .unwrap_or(Duration::ZERO);

        Ok(RateLimitStatus {
            exceeded: current.count >= u64::from(limit),
            count: current.count,
            limit: u64::from(limit),
            reset_in,
        })
    }

    /// Record one attempt now and refresh the key's TTL.
    pub async fn increment(&self, key: &str, window: Duration) -> Result<(), AppError> {
        let now_ms = self.clock.unix_millis();
        let member = format!("{now_ms}-{}", Uuid::new_v4());
        self.cache
            .window_add(key, now_ms, &member, window + WINDOW_TTL_MARGIN)
            .await
    }

    /// Check and, if still under the limit, count this request.
    ///
    /// The returned status includes the request just recorded.
    pub async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitStatus, AppError> {
        let mut status = self.check(key, limit, window).await?;
        if status.exceeded {
            return Ok(status);
        }
        self.increment(key, window).await?;
        status.count += 1;
        if status.reset_in.is_zero() {
            status.reset_in = window;
        }
        Ok(status)
    }

    /// Forget every attempt recorded under `key`.
    pub async fn reset(&self, key: &str) -> Result<(), AppError> {
        self.cache.delete(key).await
    }

    /// Block `key` outright for `duration`, independent of its window.
    pub async fn block_key(&self, key: &str, duration: Duration) -> Result<(), AppError> {
        debug!(key, block_secs = duration.as_secs(), "Rate-limit key blocked");
        self.cache.set(&keys::blocked(key), "blocked", duration).await
    }

    /// Remaining block time, or `None` when `key` is not blocked.
    pub async fn blocked_for(&self, key: &str) -> Result<Option<Duration>, AppError> {
        let ttl = self.cache.ttl(&keys::blocked(key)).await?;
        Ok(ttl.filter(|d| !d.is_zero()))
    }

    pub async fn is_key_blocked(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.blocked_for(key).await?.is_some())
    }
}
