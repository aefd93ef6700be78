//! Persisted refresh-token row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::principal::{PrincipalKind, PrincipalRef};

/// A stored refresh token.
///
/// Only the SHA-256 digest of the opaque token is persisted. A row is usable
/// while `revoked = false AND expires_at > now`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub principal_kind: PrincipalKind,
    pub principal_id: i32,
    /// Hex SHA-256 digest of the opaque token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// The owning principal.
    pub fn principal(&self) -> PrincipalRef {
        PrincipalRef::new(self.principal_kind, self.principal_id)
    }

    /// Whether the token can still be exchanged at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Data required to persist a new refresh token.
#[derive(Debug, Clone)]
pub struct CreateRefreshToken {
    pub principal: PrincipalRef,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
