//! # herp-auth
//!
//! Authentication and session core for the Herp back office.
//!
//! ## Modules
//!
//! - `password`: bcrypt/argon2 hashing and new-password policy
//! - `jwt`: access-token claims, signing, and verification
//! - `session`: opaque refresh tokens and their persistence
//! - `blacklist`: logged-out access tokens kept until natural expiry
//! - `rate_limit`: sliding-window counters and the login throttle
//! - `otp`: numeric one-time codes for email verification and resets
//! - `mailer`: outgoing transactional mail
//! - `service`: the login / refresh / logout / verify state machine

pub mod blacklist;
pub mod jwt;
pub mod mailer;
pub mod otp;
pub mod password;
pub mod rate_limit;
pub mod service;
pub mod session;

pub use blacklist::Blacklist;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use mailer::{Mailer, build_mailer};
pub use password::{PasswordHasher, PasswordValidator};
pub use rate_limit::{LoginThrottle, RateLimitStatus, RateLimiter};
pub use service::{AuthService, AuthStores, LoginRequest, LoginResult, RegisterAdmin};
pub use session::{RefreshTokenGenerator, SessionStore};
