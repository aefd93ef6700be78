//! Refresh-token persistence and issued token values.

pub mod refresh_token;
pub mod token;

pub use refresh_token::{CreateRefreshToken, RefreshToken};
pub use token::TokenPair;
