//! Roles and permission codes.

pub mod model;
pub mod permission;

pub use model::{CreateRole, Role, UpdateRole};
pub use permission::{Permission, codes};
