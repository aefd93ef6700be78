//! Outgoing transactional mail.
//!
//! [`build_mailer`] picks the HTTP provider when credentials are configured
//! and falls back to writing messages to the log otherwise.

pub mod log;
pub mod outbox;
pub mod plunk;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use herp_core::config::MailConfig;
use herp_core::error::AppError;

pub use self::log::LogMailer;
pub use self::outbox::OutboxMailer;
pub use self::plunk::PlunkMailer;

/// A single outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    /// Account verification message carrying `code`.
    pub fn verification(to: &str, username: &str, code: &str, valid_minutes: u64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your Herp account".to_string(),
            body: format!(
                "<p>Hello {username},</p>\
                 <p>Your verification code is <strong>{code}</strong>.</p>\
                 <p>It expires in {valid_minutes} minutes.</p>"
            ),
        }
    }

    /// Password reset message carrying `code`.
    pub fn password_reset(to: &str, username: &str, code: &str, valid_minutes: u64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Reset your Herp password".to_string(),
            body: format!(
                "<p>Hello {username},</p>\
                 <p>Your password reset code is <strong>{code}</strong>.</p>\
                 <p>It expires in {valid_minutes} minutes. If you did not ask \
                 for a reset, ignore this message.</p>"
            ),
        }
    }
}

/// Sends mail.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug + 'static {
    async fn send(&self, email: &Email) -> Result<(), AppError>;
}

/// Build the mailer for `config`.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, AppError> {
    if config.is_configured() {
        Ok(Arc::new(PlunkMailer::new(config)?))
    } else {
        warn!("Mail provider not configured; outgoing mail will only be logged");
        Ok(Arc::new(LogMailer))
    }
}
