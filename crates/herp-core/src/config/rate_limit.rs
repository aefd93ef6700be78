//! Login throttling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sliding-window limits for login attempts and API requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Failed attempts allowed per login identifier within the window.
    #[serde(default = "default_login_limit")]
    pub login_limit: u32,
    /// Failed attempts allowed per client IP within the window.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: u32,
    /// Window length in minutes.
    #[serde(default = "default_window")]
    pub login_window_minutes: u64,
    /// How long an identifier or IP stays blocked once it exceeds its limit.
    #[serde(default = "default_block")]
    pub block_duration_minutes: u64,
    /// Requests allowed per client IP per minute across the whole API.
    #[serde(default = "default_request_limit")]
    pub requests_per_minute: u32,
}

impl RateLimitConfig {
    /// Returns the login window as a duration.
    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window_minutes * 60)
    }

    /// Returns the block duration.
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs(self.block_duration_minutes * 60)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_limit: default_login_limit(),
            ip_limit: default_ip_limit(),
            login_window_minutes: default_window(),
            block_duration_minutes: default_block(),
            requests_per_minute: default_request_limit(),
        }
    }
}

fn default_login_limit() -> u32 {
    5
}

fn default_ip_limit() -> u32 {
    50
}

fn default_window() -> u64 {
    15
}

fn default_block() -> u64 {
    30
}

fn default_request_limit() -> u32 {
    50
}
