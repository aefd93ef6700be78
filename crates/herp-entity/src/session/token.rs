//! Token values returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access/refresh pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token. Shown to the client exactly once.
    pub refresh_token: String,
    /// Absolute expiry of the access token.
    pub expires_at: DateTime<Utc>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}
