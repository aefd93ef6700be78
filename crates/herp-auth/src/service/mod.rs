//! The authentication state machine.
//!
//! [`AuthService`] composes the stores, the password hasher, the token
//! codec, the session store, the blacklist and the login throttle. Every
//! operation takes already-parsed request fields; HTTP concerns live in the
//! API crate.

pub mod account;
pub mod auth;
pub mod types;


pub use auth::{AuthService, AuthStores};
pub use types::{LoginRequest, LoginResult, RegisterAdmin};
