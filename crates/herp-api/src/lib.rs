//! # herp-api
//!
//! HTTP API layer for Herp built on Axum.
//!
//! Provides the REST endpoints, middleware (bearer auth, permission guard,
//! per-IP rate limiting, request logging), extractors, DTOs, and the mapping
//! from [`herp_core::ErrorKind`] to HTTP status codes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
