//! Principal discriminant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which table a principal lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// Row in `users`.
    User,
    /// Row in `admins`.
    Admin,
}

impl PrincipalKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrincipalKind {
    type Err = herp_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(herp_core::AppError::validation(format!(
                "Invalid principal kind: '{s}'. Expected one of: user, admin"
            ))),
        }
    }
}

/// A principal identified without loading its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalRef {
    pub kind: PrincipalKind,
    pub id: i32,
}

impl PrincipalRef {
    pub fn new(kind: PrincipalKind, id: i32) -> Self {
        Self { kind, id }
    }

    /// Shorthand for a user reference.
    pub fn user(id: i32) -> Self {
        Self::new(PrincipalKind::User, id)
    }

    /// Shorthand for an admin reference.
    pub fn admin(id: i32) -> Self {
        Self::new(PrincipalKind::Admin, id)
    }
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("Admin".parse::<PrincipalKind>().unwrap(), PrincipalKind::Admin);
        assert!("guest".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn test_ref_display() {
        assert_eq!(PrincipalRef::user(7).to_string(), "user:7");
    }
}
