//! Mailer that only logs.

use async_trait::async_trait;
use tracing::info;

use herp_core::error::AppError;

use super::{Email, Mailer};

/// Writes each message's recipient and subject to the log.
///
/// Bodies carry one-time codes and are not logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        info!(to = %email.to, subject = %email.subject, "Mail not sent (no provider configured)");
        Ok(())
    }
}
