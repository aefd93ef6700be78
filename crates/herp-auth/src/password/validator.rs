//! Policy for newly chosen passwords.

use herp_core::config::AuthConfig;
use herp_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_score: u8,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Check length, then estimated strength.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.len() > 72 {
            return Err(AppError::validation(
                "Password must be at most 72 bytes long",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if score_value(estimate.score()) < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password.",
            ));
        }

        Ok(())
    }
}

fn score_value(score: zxcvbn::Score) -> u8 {
    match score {
        zxcvbn::Score::Zero => 0,
        zxcvbn::Score::One => 1,
        zxcvbn::Score::Two => 2,
        zxcvbn::Score::Three => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validator().validate("abc").unwrap_err();
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn test_common_password_rejected() {
        assert!(validator().validate("password").is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator().validate("correct-Horse-battery-42").is_ok());
    }
}
