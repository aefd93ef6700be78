//! Sliding-window rate limiting and the login throttle built on it.

pub mod limiter;
pub mod login;

pub use limiter::{RateLimitStatus, RateLimiter};
pub use login::LoginThrottle;
