//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use herp_service::CreateUserRequest;

/// Login request body. One of `email` or `username` is required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginBody {
    /// The identifier to log in with, preferring the email.
    pub fn identifier(&self) -> Option<&str> {
        [self.email.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}

/// Admin self-registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(length(min = 3, max = 100, message = "Username must be 3 to 100 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailBody {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordBody {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordBody {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshBody {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserBody {
    #[validate(length(min = 3, max = 100, message = "Username must be 3 to 100 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            username: body.username,
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            role_id: body.role_id,
            is_active: body.is_active,
        }
    }
}

/// Administrator-set password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetPasswordBody {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleBody {
    #[validate(length(min = 1, max = 50, message = "Role name must be 1 to 50 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_identifier_prefers_email() {
        let body = LoginBody {
            email: Some(" admin@hotel.com ".into()),
            username: Some("admin".into()),
            password: "x".into(),
        };
        assert_eq!(body.identifier(), Some("admin@hotel.com"));

        let body = LoginBody {
            email: Some(String::new()),
            username: Some("admin".into()),
            password: "x".into(),
        };
        assert_eq!(body.identifier(), Some("admin"));

        let body = LoginBody {
            email: None,
            username: None,
            password: "x".into(),
        };
        assert_eq!(body.identifier(), None);
    }

    #[test]
    fn test_register_rules() {
        let body = RegisterBody {
            username: "ab".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            first_name: None,
            last_name: None,
        };
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
