//! Numeric one-time codes for email verification and password reset.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Number of digits in every code.
pub const CODE_LENGTH: usize = 7;

/// A generated code and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Generate a fresh code valid for `ttl` from `now`.
    pub fn generate(now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        Self {
            code: generate_code(),
            expires_at: now + ttl,
        }
    }
}

/// A uniformly random 7-digit code without a leading zero.
pub fn generate_code() -> String {
    rand::rng().random_range(1_000_000..10_000_000u32).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let otp = OneTimeCode::generate(now, Duration::from_secs(600));
        assert_eq!(otp.expires_at - now, chrono::Duration::minutes(10));
    }
}
