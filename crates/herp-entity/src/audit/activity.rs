//! Activity log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::principal::PrincipalKind;

/// An immutable record of an action taken by a principal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub actor_kind: PrincipalKind,
    pub actor_id: i32,
    /// The action performed (e.g. `"user.create"`, `"role.permission.add"`).
    pub action: String,
    /// Type of the target resource (e.g. `"user"`, `"role"`).
    pub target_type: String,
    pub target_id: Option<String>,
    /// Additional details (JSON).
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to create an activity log entry.
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub actor_kind: PrincipalKind,
    pub actor_id: i32,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}
