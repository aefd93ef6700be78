//! Administration handlers. Routes are guarded by `admin:manage`.

pub mod audit;
pub mod roles;
pub mod users;
