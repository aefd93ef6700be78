//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Result of trimming and counting a sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowCount {
    /// Entries remaining inside the window.
    pub count: u64,
    /// Score (Unix milliseconds) of the oldest remaining entry.
    pub oldest_ms: Option<i64>,
}

/// Trait for cache backends (Redis or in-memory).
///
/// All values are stored as strings. The cache provider is responsible for
/// key prefixing and TTL enforcement.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Remaining TTL of a key, or `None` if the key is absent or has no expiry.
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// Record one entry in a sliding window keyed by `key`.
    ///
    /// `score_ms` is the entry's timestamp; `member` must be unique per entry.
    /// The whole window expires after `ttl`.
    async fn window_add(&self, key: &str, score_ms: i64, member: &str, ttl: Duration)
    -> AppResult<()>;

    /// Drop window entries with a score below `min_score_ms` and count what
    /// remains. Trim and count happen atomically.
    async fn window_count(&self, key: &str, min_score_ms: i64) -> AppResult<WindowCount>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
