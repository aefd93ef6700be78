//! Permission entity and well-known permission codes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A permission code granted to roles through `role_permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: i32,
    /// Permission code, e.g. `"pos:sell"`.
    pub code: String,
    pub description: Option<String>,
}

/// Permission codes seeded by the initial migration.
pub mod codes {
    pub const POS_SELL: &str = "pos:sell";
    pub const POS_VIEW: &str = "pos:view";
    pub const POS_MANAGE_ITEMS: &str = "pos:manage_items";
    pub const BOOKING_CREATE: &str = "booking:create";
    pub const BOOKING_MANAGE: &str = "booking:manage";
    /// Guards user and role administration.
    pub const ADMIN_MANAGE: &str = "admin:manage";
}
