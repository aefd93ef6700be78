//! Redis cache provider implementation.
//!
//! Sliding windows are sorted sets scored by Unix milliseconds. Trim and
//! count run in one `MULTI` block so concurrent processes never observe a
//! half-trimmed window.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};

use herp_core::error::{AppError, ErrorKind};
use herp_core::result::AppResult;
use herp_core::traits::{CacheProvider, WindowCount};

use super::client::RedisClient;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Await a command under the configured timeout.
    async fn run<T>(&self, command: impl Future<Output = RedisResult<T>>) -> AppResult<T> {
        match tokio::time::timeout(self.client.command_timeout(), command).await {
            Ok(result) => result.map_err(Self::map_err),
            Err(_) => Err(AppError::cache("Redis command timed out")),
        }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

/// Redis rejects a zero expiry; round sub-millisecond TTLs up.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.run(conn.get(&full_key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let cmd = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .to_owned();
        self.run(cmd.query_async::<()>(&mut conn)).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.run(conn.del::<_, ()>(&full_key)).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.run(conn.exists(&full_key)).await
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        // -2: missing, -1: no expiry.
        let cmd = redis::cmd("PTTL").arg(&full_key).to_owned();
        let millis: i64 = self.run(cmd.query_async(&mut conn)).await?;
        Ok((millis > 0).then(|| Duration::from_millis(millis as u64)))
    }

    async fn window_add(
        &self,
        key: &str,
        score_ms: i64,
        member: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let pipe = redis::pipe()
            .atomic()
            .zadd(&full_key, member, score_ms)
            .ignore()
            .cmd("PEXPIRE")
            .arg(&full_key)
            .arg(ttl_millis(ttl))
            .ignore()
            .to_owned();
        self.run(pipe.query_async::<()>(&mut conn)).await
    }

    async fn window_count(&self, key: &str, min_score_ms: i64) -> AppResult<WindowCount> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let pipe = redis::pipe()
            .atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(&full_key)
            .arg("-inf")
            .arg(format!("({min_score_ms}"))
            .ignore()
            .cmd("ZCARD")
            .arg(&full_key)
            .cmd("ZRANGE")
            .arg(&full_key)
            .arg(0)
            .arg(0)
            .arg("WITHSCORES")
            .to_owned();
        let (count, oldest): (u64, Vec<(String, f64)>) =
            self.run(pipe.query_async(&mut conn)).await?;

        Ok(WindowCount {
            count,
            oldest_ms: oldest.first().map(|(_, score)| *score as i64),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = self.run(redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(pong == "PONG")
    }
}
