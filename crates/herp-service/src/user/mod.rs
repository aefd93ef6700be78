//! Administrative user management.

pub mod service;

pub use service::{CreateUserRequest, UserAdminService};
