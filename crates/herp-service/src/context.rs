//! Request context carrying the authenticated principal and its permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herp_auth::Claims;
use herp_core::error::AppError;
use herp_entity::principal::PrincipalRef;

/// Context for the current authenticated request.
///
/// Built by the API layer from verified access-token claims and passed
/// into service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting principal.
    pub principal: PrincipalRef,
    pub username: String,
    /// Role name at token issuance.
    pub role: String,
    /// Permission codes at token issuance.
    pub permissions: Vec<String>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn from_claims(claims: &Claims, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            principal: claims.principal(),
            username: claims.username.clone(),
            role: claims.role.clone(),
            permissions: claims.permissions.clone(),
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }

    /// `Forbidden` unless the caller holds `code`.
    pub fn require_permission(&self, code: &str) -> Result<(), AppError> {
        if self.has_permission(code) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Missing permission: {code}")))
        }
    }
}
