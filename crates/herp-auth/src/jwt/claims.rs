//! Claims carried by every access token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herp_entity::principal::{PrincipalKind, PrincipalRef};

/// JWT claims payload.
///
/// Field names on the wire are camelCase (`userId`, `tokenType`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Principal id within its own table.
    pub user_id: i32,
    pub username: String,
    pub email: String,
    /// Role name at issuance.
    pub role: String,
    /// Permission codes granted through the role at issuance.
    pub permissions: Vec<String>,
    pub token_type: TokenType,
    /// Which table `user_id` refers to.
    pub principal_kind: PrincipalKind,
    /// Unique token id.
    pub jti: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Token-type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
}

impl Claims {
    /// The principal this token was issued to.
    pub fn principal(&self) -> PrincipalRef {
        PrincipalRef::new(self.principal_kind, self.user_id)
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Time left until `exp` at `now`, or `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let seconds = self.exp - now.timestamp();
        (seconds > 0).then(|| Duration::from_secs(seconds as u64))
    }

    /// Simple membership test on the permission list.
    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }
}
