//! Administrator entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An administrator account.
///
/// Administrators register themselves, verify their email with a one-time
/// code, and can reset a forgotten password with another one-time code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    /// Unique admin identifier.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// bcrypt or argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Assigned role.
    pub role_id: i32,
    /// Name of the assigned role.
    pub role_name: String,
    pub is_active: bool,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Pending verification code.
    #[serde(skip_serializing, default)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing, default)]
    pub verification_expires_at: Option<DateTime<Utc>>,
    /// Pending password reset code.
    #[serde(skip_serializing, default)]
    pub reset_code: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    /// Check a verification code against the stored one at `now`.
    pub fn verification_code_matches(&self, code: &str, now: DateTime<Utc>) -> bool {
        code_matches(
            self.verification_code.as_deref(),
            self.verification_expires_at,
            code,
            now,
        )
    }

    /// Check a reset code against the stored one at `now`.
    pub fn reset_code_matches(&self, code: &str, now: DateTime<Utc>) -> bool {
        code_matches(self.reset_code.as_deref(), self.reset_code_expires_at, code, now)
    }
}

fn code_matches(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    presented: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires_at) {
        (Some(stored), Some(expires_at)) => stored == presented && expires_at > now,
        _ => false,
    }
}

/// Data required to create a new admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdmin {
    pub username: String,
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn admin() -> Admin {
        let now = Utc::now();
        Admin {
            id: 1,
            username: "root".into(),
            email: "root@hotel.com".into(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            role_id: 1,
            role_name: "admin".into(),
            is_active: true,
            email_verified: false,
            verification_code: Some("1234567".into()),
            verification_expires_at: Some(now + Duration::minutes(10)),
            reset_code: None,
            reset_code_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_verification_code_checks_value_and_expiry() {
        let admin = admin();
        let now = Utc::now();
        assert!(admin.verification_code_matches("1234567", now));
        assert!(!admin.verification_code_matches("7654321", now));
        assert!(!admin.verification_code_matches("1234567", now + Duration::minutes(11)));
    }

    #[test]
    fn test_missing_reset_code_never_matches() {
        assert!(!admin().reset_code_matches("", Utc::now()));
    }
}
