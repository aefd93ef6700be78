//! # herp-cache
//!
//! Cache provider implementations for Herp. Two modes:
//!
//! - **memory**: in-process cache on a `DashMap`, with TTLs measured against
//!   an injectable clock
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration. The blacklist
//! and the rate limiter only ever see the [`CacheManager`].

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
