//! Opaque refresh tokens.
//!
//! A refresh token is 32 bytes from the OS-seeded thread RNG, base64url
//! encoded. It carries no claims; its only meaning is as a lookup key. The
//! database stores a peppered SHA-256 digest, never the token itself.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// Generates refresh tokens and derives their storage digest.
#[derive(Clone)]
pub struct RefreshTokenGenerator {
    pepper: String,
}

impl std::fmt::Debug for RefreshTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenGenerator")
            .field("pepper", &"<redacted>")
            .finish()
    }
}

impl RefreshTokenGenerator {
    /// `pepper` is the refresh-token secret.
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    /// A fresh 256-bit token.
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hex digest under which the token is persisted.
    pub fn digest(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pepper.as_bytes());
        hasher.update(b":");
        hasher.update(token.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_long_and_unique() {
        let generator = RefreshTokenGenerator::new("pepper");
        let tokens: HashSet<String> = (0..100).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 100);
        for token in &tokens {
            assert_eq!(URL_SAFE_NO_PAD.decode(token).unwrap().len(), 32);
        }
    }

    #[test]
    fn test_digest_depends_on_pepper() {
        let a = RefreshTokenGenerator::new("one");
        let b = RefreshTokenGenerator::new("two");
        assert_eq!(a.digest("tok"), a.digest("tok"));
        assert_ne!(a.digest("tok"), b.digest("tok"));
        assert_eq!(a.digest("tok").len(), 64);
    }

    #[test]
    fn test_debug_hides_pepper() {
        let generator = RefreshTokenGenerator::new("super-secret-pepper");
        let rendered = format!("{generator:?}");
        assert!(!rendered.contains("super-secret-pepper"));
    }
}
