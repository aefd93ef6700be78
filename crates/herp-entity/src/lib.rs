//! # herp-entity
//!
//! Domain entity models for the Herp back office. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod audit;
pub mod principal;
pub mod role;
pub mod session;
