//! Password hashing and verification.
//!
//! New hashes use the configured algorithm (bcrypt by default). Verification
//! dispatches on the stored hash's prefix, so accounts hashed with either
//! algorithm keep working.

use std::str::FromStr;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use herp_core::config::AuthConfig;
use herp_core::error::{AppError, ErrorKind};

/// Algorithm used for newly created hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Bcrypt,
    Argon2id,
}

impl FromStr for HashAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            "argon2" | "argon2id" => Ok(Self::Argon2id),
            other => Err(AppError::configuration(format!(
                "Unknown password algorithm: '{other}'. Supported: bcrypt, argon2"
            ))),
        }
    }
}

/// Hashes and verifies passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    algorithm: HashAlgorithm,
    bcrypt_cost: u32,
}

impl PasswordHasher {
    pub fn new(algorithm: HashAlgorithm, bcrypt_cost: u32) -> Self {
        Self {
            algorithm,
            bcrypt_cost,
        }
    }

    /// Build from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Ok(Self::new(
            config.password_algorithm.parse()?,
            config.bcrypt_cost,
        ))
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        match self.algorithm {
            HashAlgorithm::Bcrypt => bcrypt::hash(password, self.bcrypt_cost).map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Password hashing failed", e)
            }),
            HashAlgorithm::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
            }
        }
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. Only a malformed hash is an error.
    pub fn verify(&self, hash: &str, password: &str) -> Result<bool, AppError> {
        if hash.starts_with("$argon2") {
            let parsed = PasswordHash::new(hash)
                .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;
            return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AppError::internal(format!(
                    "Password verification failed: {e}"
                ))),
            };
        }

        bcrypt::verify(password, hash).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Invalid password hash format", e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_roundtrip() {
        let hasher = PasswordHasher::new(HashAlgorithm::Bcrypt, 4);
        let hash = hasher.hash("password").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify(&hash, "password").unwrap());
        assert!(!hasher.verify(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn test_argon2_hashes_verify_under_bcrypt_default() {
        let argon = PasswordHasher::new(HashAlgorithm::Argon2id, 4);
        let hash = argon.hash("s3cret").unwrap();

        let hasher = PasswordHasher::new(HashAlgorithm::Bcrypt, 4);
        assert!(hasher.verify(&hash, "s3cret").unwrap());
        assert!(!hasher.verify(&hash, "nope").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new(HashAlgorithm::Bcrypt, 4);
        assert!(hasher.verify("not-a-hash", "password").is_err());
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
