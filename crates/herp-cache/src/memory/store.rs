//! In-memory cache implementation on `DashMap`.
//!
//! Every key operation runs under the map's per-shard entry lock, so the
//! window trim-and-count is atomic within the process. Expiry is lazy and
//! measured against the injected [`Clock`]. At capacity, expired entries are
//! purged first, then the entries closest to expiry are evicted until the
//! map is back under its low-water mark.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use herp_core::config::MemoryCacheConfig;
use herp_core::error::AppError;
use herp_core::result::AppResult;
use herp_core::traits::{CacheProvider, Clock, WindowCount};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    /// Member -> score in Unix milliseconds.
    Window(BTreeMap<String, i64>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory cache provider.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    entries: Arc<DashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    max_capacity: usize,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache.
    pub fn new(config: &MemoryCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            max_capacity: config.max_capacity as usize,
        }
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| self.clock.now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Make room for one more entry once the map reaches capacity.
    ///
    /// Expired entries go first. If that is not enough, the entries that
    /// would expire soonest are evicted until the map is at the low-water
    /// mark, so a full map is not rescanned on every write.
    fn evict_if_full(&self) {
        if self.entries.len() < self.max_capacity {
            return;
        }
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));

        let target = low_water_mark(self.max_capacity);
        let live = self.entries.len();
        if live > target {
            let mut by_expiry: Vec<(Option<DateTime<Utc>>, String)> = self
                .entries
                .iter()
                .map(|e| (e.value().expires_at, e.key().clone()))
                .collect();
            // Entries without an expiry sort last.
            by_expiry.sort_by(|a, b| match (a.0, b.0) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            for (_, key) in by_expiry.into_iter().take(live - target) {
                self.entries.remove(&key);
            }
            warn!(
                capacity = self.max_capacity,
                evicted_live = live - self.entries.len(),
                "Memory cache full, evicted live entries"
            );
        }
        debug!(evicted = before - self.entries.len(), "Evicted cache entries");
    }

    /// Live entry for `key`, removing it if expired.
    fn live(&self, key: &str) -> Option<Entry> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?.clone();
        if entry.is_live(now) {
            Some(entry)
        } else {
            self.entries.remove_if(key, |_, e| !e.is_live(now));
            None
        }
    }
}

/// Size to shrink to when eviction has to drop live entries: 90% of
/// capacity, and always below it.
fn low_water_mark(capacity: usize) -> usize {
    (capacity - capacity / 10).min(capacity.saturating_sub(1))
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.live(key) {
            Some(Entry {
                value: Value::Text(text),
                ..
            }) => Ok(Some(text)),
            Some(_) => Err(AppError::cache(format!("Key '{key}' does not hold a string"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.evict_if_full();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Some(self.expiry(ttl)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.live(key).is_some())
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let now = self.clock.now();
        Ok(self
            .live(key)
            .and_then(|entry| entry.expires_at)
            .and_then(|at| (at - now).to_std().ok()))
    }

    async fn window_add(
        &self,
        key: &str,
        score_ms: i64,
        member: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        self.evict_if_full();
        let now = self.clock.now();
        let expires_at = Some(self.expiry(ttl));
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: Value::Window(BTreeMap::new()),
            expires_at,
        });
        if !entry.is_live(now) {
            entry.value = Value::Window(BTreeMap::new());
        }
        let Value::Window(members) = &mut entry.value else {
            return Err(AppError::cache(format!("Key '{key}' does not hold a window")));
        };
        members.insert(member.to_string(), score_ms);
        entry.expires_at = expires_at;
        Ok(())
    }

    async fn window_count(&self, key: &str, min_score_ms: i64) -> AppResult<WindowCount> {
        let now = self.clock.now();
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(WindowCount::default());
        };
        if !entry.is_live(now) {
            return Ok(WindowCount::default());
        }
        let Value::Window(members) = &mut entry.value else {
            return Err(AppError::cache(format!("Key '{key}' does not hold a window")));
        };
        members.retain(|_, score| *score >= min_score_ms);
        Ok(WindowCount {
            count: members.len() as u64,
            oldest_ms: members.values().min().copied(),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
