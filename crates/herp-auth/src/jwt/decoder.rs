//! Access-token verification.
//!
//! Expiry is checked against the injected clock rather than inside
//! `jsonwebtoken`, so tests can move time.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use herp_core::config::AuthConfig;
use herp_core::error::AppError;
use herp_core::traits::Clock;

use super::claims::{Claims, TokenType};

/// Verifies access-token signature, shape, and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            leeway: config.leeway_seconds as i64,
            clock,
        }
    }

    /// Verify signature, token type, and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_signed(token)?;
        if self.clock.unix_seconds() >= claims.exp + self.leeway {
            return Err(AppError::token_invalid("Token has expired"));
        }
        Ok(claims)
    }

    /// Verify signature and token type but accept expired tokens.
    pub fn decode_signed(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => {
                    AppError::token_invalid("Invalid token signature")
                }
                JwtErrorKind::InvalidAlgorithm => {
                    AppError::token_invalid("Invalid token algorithm")
                }
                _ => AppError::token_invalid("Malformed token"),
            })?
            .claims;

        if claims.token_type != TokenType::Access {
            return Err(AppError::token_invalid(
                "Invalid token type: expected access token",
            ));
        }
        Ok(claims)
    }

    /// How long the token stays verifiable, including clock-skew leeway.
    pub fn remaining_validity(&self, claims: &Claims) -> Option<Duration> {
        let seconds = claims.exp + self.leeway - self.clock.unix_seconds();
        (seconds > 0).then(|| Duration::from_secs(seconds as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use chrono::Utc;
    use herp_core::ErrorKind;
    use herp_core::traits::ManualClock;
    use herp_entity::principal::{Principal, User};

    fn principal() -> Principal {
        let now = Utc::now();
        Principal::User(User {
            id: 42,
            username: "frontdesk".into(),
            email: Some("desk@hotel.com".into()),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            role_id: 2,
            role_name: "pos_staff".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    fn codec(secret: &str) -> (JwtEncoder, JwtDecoder, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let config = AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        };
        (
            JwtEncoder::new(&config, clock.clone()),
            JwtDecoder::new(&config, clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_verify_returns_issued_claims() {
        let (encoder, decoder, _) = codec("secret");
        let perms = vec!["pos:sell".to_string(), "pos:view".to_string()];
        let issued = encoder.issue_access(&principal(), perms.clone()).unwrap();

        let claims = decoder.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "desk@hotel.com");
        assert_eq!(claims.role, "pos_staff");
        assert_eq!(claims.permissions, perms);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let (encoder, decoder, clock) = codec("secret");
        let issued = encoder.issue_access(&principal(), vec![]).unwrap();
        clock.advance(Duration::from_secs(15 * 60 + 10));

        let err = decoder.verify(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
        assert!(decoder.decode_signed(&issued.token).is_ok());
        assert_eq!(decoder.remaining_validity(&issued.claims), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (encoder, _, _) = codec("secret");
        let (_, other, _) = codec("another-secret");
        let issued = encoder.issue_access(&principal(), vec![]).unwrap();
        let err = other.verify(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
        assert_eq!(err.message, "Invalid token signature");
    }

    #[test]
    fn test_garbage_rejected() {
        let (_, decoder, _) = codec("secret");
        let err = decoder.verify("not.a.jwt").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }
}
