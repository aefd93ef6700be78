//! Outgoing mail configuration.

use serde::{Deserialize, Serialize};

/// Transactional mail provider configuration.
///
/// When `secret_key` is empty, mail is written to the log instead of sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    /// Base URL of the mail provider API.
    #[serde(default)]
    pub base_url: String,
    /// Bearer key for the mail provider.
    #[serde(default)]
    pub secret_key: String,
    /// Request timeout in seconds (0 uses the client default).
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl MailConfig {
    /// Returns whether a real provider is configured.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.secret_key.is_empty()
    }
}
