//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Secret key for refresh-token related signing. Falls back to `jwt_secret`.
    #[serde(default)]
    pub jwt_refresh_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Clock skew tolerated when checking token expiry, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Hash algorithm for new passwords: `"bcrypt"` or `"argon2"`.
    #[serde(default = "default_algorithm")]
    pub password_algorithm: String,
    /// bcrypt cost factor for new hashes.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Minimum password length for new passwords.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4) for new passwords.
    #[serde(default = "default_password_score")]
    pub password_min_score: u8,
    /// Email verification code lifetime in minutes.
    #[serde(default = "default_verification_ttl")]
    pub verification_code_ttl_minutes: u64,
    /// Password reset code lifetime in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_code_ttl_minutes: u64,
    /// Role assigned to self-registered administrators.
    #[serde(default = "default_admin_role")]
    pub default_admin_role_id: i32,
}

impl AuthConfig {
    /// Returns the secret used for refresh-side signing, falling back to the
    /// access secret when none is configured.
    pub fn refresh_secret(&self) -> &str {
        if self.jwt_refresh_secret.is_empty() {
            &self.jwt_secret
        } else {
            &self.jwt_refresh_secret
        }
    }

    /// Returns whether the access secret is still the shipped placeholder
    /// (or empty).
    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret.is_empty() || self.jwt_secret == PLACEHOLDER_JWT_SECRET
    }

    /// Returns whether a dedicated refresh secret is configured.
    pub fn has_dedicated_refresh_secret(&self) -> bool {
        !self.jwt_refresh_secret.is_empty() && self.jwt_refresh_secret != self.jwt_secret
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_minutes * 60)
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_hours * 3600)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_refresh_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
            password_algorithm: default_algorithm(),
            bcrypt_cost: default_bcrypt_cost(),
            password_min_length: default_password_min(),
            password_min_score: default_password_score(),
            verification_code_ttl_minutes: default_verification_ttl(),
            reset_code_ttl_minutes: default_reset_ttl(),
            default_admin_role_id: default_admin_role(),
        }
    }
}

/// Value of `jwt_secret` when none is configured.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    720
}

fn default_leeway() -> u64 {
    5
}

fn default_algorithm() -> String {
    "bcrypt".to_string()
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_password_min() -> usize {
    8
}

fn default_password_score() -> u8 {
    2
}

fn default_verification_ttl() -> u64 {
    10
}

fn default_reset_ttl() -> u64 {
    15
}

fn default_admin_role() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_secret_falls_back() {
        let mut config = AuthConfig::default();
        config.jwt_secret = "access".to_string();
        assert_eq!(config.refresh_secret(), "access");
        assert!(!config.has_dedicated_refresh_secret());

        config.jwt_refresh_secret = "refresh".to_string();
        assert_eq!(config.refresh_secret(), "refresh");
        assert!(config.has_dedicated_refresh_secret());
    }

    #[test]
    fn test_placeholder_secret_detected() {
        let mut config = AuthConfig::default();
        assert!(config.uses_placeholder_secret());

        config.jwt_secret = String::new();
        assert!(config.uses_placeholder_secret());

        config.jwt_secret = "a-real-deployment-secret".to_string();
        assert!(!config.uses_placeholder_secret());
    }
}
