//! Role and permission management.

pub mod service;

pub use service::{RoleDetail, RoleService};
