//! # herp-core
//!
//! Core crate for the Herp back office. Contains the unified error system,
//! configuration schemas, and the traits other crates implement
//! (cache backends and clocks).
//!
//! This crate has **no** internal dependencies on other Herp crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
