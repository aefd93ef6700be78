//! HTTP transactional-mail provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use herp_core::config::MailConfig;
use herp_core::error::{AppError, ErrorKind};

use super::{Email, Mailer};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Sends mail with `POST {base_url}/v1/send` and a bearer key.
pub struct PlunkMailer {
    client: Client,
    endpoint: String,
    secret_key: String,
}

impl std::fmt::Debug for PlunkMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlunkMailer")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl PlunkMailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder().user_agent(concat!("herp/", env!("CARGO_PKG_VERSION")));
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder.build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build mail client", e)
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/send", config.base_url.trim_end_matches('/')),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl Mailer for PlunkMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .json(&SendRequest {
                to: &email.to,
                subject: &email.subject,
                body: &email.body,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Mail request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Mail provider rejected message");
            return Err(AppError::external(format!(
                "Mail provider returned {status}"
            )));
        }

        debug!(subject = %email.subject, "Mail sent");
        Ok(())
    }
}
