//! # herp-service
//!
//! Administrator-facing services for the Herp back office. Each service
//! takes its dependencies at construction time as `Arc`s and receives a
//! [`RequestContext`] describing who is acting.

pub mod activity;
pub mod context;
pub mod role;
pub mod user;

pub use activity::ActivityRecorder;
pub use context::RequestContext;
pub use role::{RoleDetail, RoleService};
pub use user::{CreateUserRequest, UserAdminService};
