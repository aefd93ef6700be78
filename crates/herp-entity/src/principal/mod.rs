//! Authenticated identities.
//!
//! End-users and administrators live in separate tables but share one login
//! flow. Both are converged into [`Principal`] right after lookup so that
//! permission resolution and token issuance never branch on the kind.

pub mod admin;
pub mod kind;
pub mod user;

pub use admin::{Admin, CreateAdmin};
pub use kind::{PrincipalKind, PrincipalRef};
pub use user::{CreateUser, UpdateUser, User};

use serde::Serialize;

/// Either kind of authenticated identity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    /// A point-of-sale or back-office user.
    User(User),
    /// An administrator.
    Admin(Admin),
}

impl Principal {
    /// Returns the discriminant.
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User(_) => PrincipalKind::User,
            Self::Admin(_) => PrincipalKind::Admin,
        }
    }

    /// Returns the row id within its own table.
    pub fn id(&self) -> i32 {
        match self {
            Self::User(u) => u.id,
            Self::Admin(a) => a.id,
        }
    }

    /// Returns the `(kind, id)` pair used to key refresh tokens.
    pub fn reference(&self) -> PrincipalRef {
        PrincipalRef::new(self.kind(), self.id())
    }

    pub fn username(&self) -> &str {
        match self {
            Self::User(u) => &u.username,
            Self::Admin(a) => &a.username,
        }
    }

    /// Email address; users may have none, in which case this is empty.
    pub fn email(&self) -> &str {
        match self {
            Self::User(u) => u.email.as_deref().unwrap_or(""),
            Self::Admin(a) => &a.email,
        }
    }

    pub fn role_id(&self) -> i32 {
        match self {
            Self::User(u) => u.role_id,
            Self::Admin(a) => a.role_id,
        }
    }

    pub fn role_name(&self) -> &str {
        match self {
            Self::User(u) => &u.role_name,
            Self::Admin(a) => &a.role_name,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Self::User(u) => &u.password_hash,
            Self::Admin(a) => &a.password_hash,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::User(u) => u.is_active,
            Self::Admin(a) => a.is_active,
        }
    }
}
