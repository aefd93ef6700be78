//! Custom Axum extractors.

pub mod auth;
pub mod client;
pub mod json;

pub use auth::{AuthUser, BearerToken};
pub use client::{ClientInfo, client_ip};
pub use json::ValidatedJson;
