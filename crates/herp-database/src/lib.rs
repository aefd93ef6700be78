//! # herp-database
//!
//! PostgreSQL connection management, migrations, and repositories for the
//! Herp back office. The auth core talks to persistence only through the
//! traits in [`store`]; [`PgStore`] implements them over PostgreSQL and
//! [`MemoryStore`] implements them in memory for tests and local runs.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::PgStore;
pub use store::memory::MemoryStore;
pub use store::{AuditStore, PrincipalStore, RefreshTokenStore, RoleStore};
