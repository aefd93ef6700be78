//! Refresh-token generation and persistence.

pub mod refresh;
pub mod store;

pub use refresh::RefreshTokenGenerator;
pub use store::{IssuedRefreshToken, SessionStore};
