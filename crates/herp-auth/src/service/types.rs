//! Inputs and outputs of the auth operations.

use serde::Serialize;

use herp_entity::principal::Principal;
use herp_entity::session::TokenPair;

/// A login attempt as received from the client.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Email or username, of either a user or an admin.
    pub identifier: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl LoginRequest {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn from_client(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip;
        self.user_agent = user_agent;
        self
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub tokens: TokenPair,
    pub principal: Principal,
}

/// Self-registration of an administrator.
#[derive(Debug, Clone)]
pub struct RegisterAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
