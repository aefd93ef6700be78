//! Login history and activity log entries.

pub mod activity;
pub mod login;

pub use activity::{ActivityLog, CreateActivityLog};
pub use login::{CreateLoginHistory, LoginHistory, LoginOutcome};
