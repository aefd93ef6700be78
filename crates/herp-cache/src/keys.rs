//! Cache key builders for every Herp cache entry.
//!
//! The Redis provider prepends its configured prefix; these builders only
//! produce the logical part.

/// Blacklisted access token, keyed by the token's SHA-256 digest.
pub fn jwt_blacklist(token_digest: &str) -> String {
    format!("jwt:blacklist:{token_digest}")
}

/// Sliding window of failed login attempts for one login identifier.
pub fn login_attempts_identifier(identifier: &str) -> String {
    format!("ratelimit:login:id:{}", identifier.to_lowercase())
}

/// Sliding window of failed login attempts from one client IP.
pub fn login_attempts_ip(ip: &str) -> String {
    format!("ratelimit:login:ip:{ip}")
}

/// Escalation block for a rate-limit key.
pub fn blocked(window_key: &str) -> String {
    format!("{window_key}:blocked")
}

/// Sliding window of API requests from one client IP.
pub fn api_requests_ip(ip: &str) -> String {
    format!("ratelimit:api:ip:{ip}")
}

/// Cached user record served by the admin API.
pub fn user_by_id(user_id: i32) -> String {
    format!("user:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_keys_are_case_folded() {
        assert_eq!(
            login_attempts_identifier("Admin@Hotel.com"),
            "ratelimit:login:id:admin@hotel.com"
        );
    }

    #[test]
    fn test_blocked_key_derives_from_window() {
        assert_eq!(
            blocked(&login_attempts_ip("10.0.0.1")),
            "ratelimit:login:ip:10.0.0.1:blocked"
        );
    }
}
