//! Login history entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::principal::PrincipalKind;

/// Why a login attempt ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginOutcome {
    Success,
    UnknownIdentifier,
    WrongPassword,
    Inactive,
    RateLimited,
}

impl LoginOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::WrongPassword => "wrong_password",
            Self::Inactive => "inactive",
            Self::RateLimited => "rate_limited",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded login attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginHistory {
    pub id: i64,
    /// Set when the identifier resolved to a principal.
    pub principal_kind: Option<PrincipalKind>,
    pub principal_id: Option<i32>,
    /// The identifier as typed by the client.
    pub identifier: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    /// Failure reason; `None` on success.
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to record a login attempt.
#[derive(Debug, Clone)]
pub struct CreateLoginHistory {
    pub principal_kind: Option<PrincipalKind>,
    pub principal_id: Option<i32>,
    pub identifier: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub outcome: LoginOutcome,
}
