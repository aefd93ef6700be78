//! PostgreSQL repositories.
//!
//! Each repository owns a clone of the pool and exposes inherent query
//! methods. [`PgStore`] bundles them and implements the store traits.

pub mod admin;
pub mod audit;
pub mod pg_store;
pub mod refresh_token;
pub mod role;
pub mod user;

pub use admin::AdminRepository;
pub use audit::AuditRepository;
pub use pg_store::PgStore;
pub use refresh_token::RefreshTokenRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use herp_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning constraint violations into `Conflict`.
pub(crate) fn map_db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let violation = e.as_database_error().and_then(|db| {
            if db.is_unique_violation() {
                Some("already exists")
            } else if db.is_foreign_key_violation() {
                Some("is still referenced or references a missing row")
            } else {
                None
            }
        });
        match violation {
            Some(detail) => AppError::with_source(
                ErrorKind::Conflict,
                format!("{context}: resource {detail}"),
                e,
            ),
            None => AppError::with_source(ErrorKind::Database, context, e),
        }
    }
}
