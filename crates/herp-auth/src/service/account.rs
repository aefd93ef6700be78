//! Administrator self-service: registration, email verification, and
//! password reset by one-time code.
//!
//! A wrong, expired, or already-consumed code is a soft failure (`false`);
//! only storage errors are returned as `Err`.

use std::time::Duration;

use tracing::{debug, info};

use herp_core::error::{AppError, best_effort};
use herp_entity::principal::{Admin, CreateAdmin, PrincipalRef};

use crate::mailer::Email;
use crate::otp::OneTimeCode;

use super::auth::AuthService;
use super::types::RegisterAdmin;

impl AuthService {
    /// Create an active, unverified admin and mail a verification code.
    ///
    /// Duplicate username or email fails with `Conflict`.
    pub async fn register_admin(&self, request: RegisterAdmin) -> Result<Admin, AppError> {
        let admin = self.create_admin_record(request).await?;

        let ttl_minutes = self.config.verification_code_ttl_minutes;
        let otp = OneTimeCode::generate(self.clock.now(), minutes(ttl_minutes));
        self.stores
            .principals
            .set_verification_code(admin.id, &otp.code, otp.expires_at)
            .await?;

        let message = Email::verification(&admin.email, &admin.username, &otp.code, ttl_minutes);
        best_effort("send_verification_email", self.mailer.send(&message)).await;

        info!(admin_id = admin.id, "Admin registered");
        Ok(admin)
    }

    /// Create an admin whose email is already verified. Used by operator
    /// tooling; nothing is mailed.
    pub async fn provision_admin(&self, request: RegisterAdmin) -> Result<Admin, AppError> {
        let admin = self.create_admin_record(request).await?;

        if !self
            .stores
            .principals
            .mark_email_verified(admin.id, self.clock.now())
            .await?
        {
            return Err(AppError::internal("Provisioned admin disappeared"));
        }

        let admin = self
            .stores
            .principals
            .find_admin_by_id(admin.id)
            .await?
            .ok_or_else(|| AppError::internal("Provisioned admin disappeared"))?;
        info!(admin_id = admin.id, "Admin provisioned");
        Ok(admin)
    }

    async fn create_admin_record(&self, request: RegisterAdmin) -> Result<Admin, AppError> {
        let username = request.username.trim();
        let email = request.email.trim();
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        if !is_plausible_email(email) {
            return Err(AppError::validation("A valid email address is required"));
        }
        self.validator.validate(&request.password)?;

        let password_hash = self.hash_password(&request.password).await?;
        self.stores
            .principals
            .create_admin(CreateAdmin {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                role_id: self.config.default_admin_role_id,
            })
            .await
    }

    /// Confirm an admin's email with the mailed code.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<bool, AppError> {
        let Some(admin) = self.stores.principals.find_admin_by_email(email.trim()).await? else {
            return Ok(false);
        };
        if admin.email_verified {
            return Ok(false);
        }
        let confirmed = self
            .stores
            .principals
            .confirm_email(admin.id, code.trim(), self.clock.now())
            .await?;
        if confirmed {
            info!(admin_id = admin.id, "Admin email verified");
        }
        Ok(confirmed)
    }

    /// Store and mail a reset code if `email` belongs to an admin.
    ///
    /// Succeeds whether or not the address is known.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let Some(admin) = self.stores.principals.find_admin_by_email(email.trim()).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let ttl_minutes = self.config.reset_code_ttl_minutes;
        let otp = OneTimeCode::generate(self.clock.now(), minutes(ttl_minutes));
        self.stores
            .principals
            .set_reset_code(admin.id, &otp.code, otp.expires_at)
            .await?;

        let message =
            Email::password_reset(&admin.email, &admin.username, &otp.code, ttl_minutes);
        best_effort("send_reset_email", self.mailer.send(&message)).await;

        info!(admin_id = admin.id, "Password reset code issued");
        Ok(())
    }

    /// Replace an admin's password using a reset code, then end every
    /// session of that admin.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<bool, AppError> {
        self.validator.validate(new_password)?;

        let Some(admin) = self.stores.principals.find_admin_by_email(email.trim()).await? else {
            return Ok(false);
        };
        let code = code.trim();
        let now = self.clock.now();
        if !admin.reset_code_matches(code, now) {
            return Ok(false);
        }

        let password_hash = self.hash_password(new_password).await?;
        let applied = self
            .stores
            .principals
            .reset_admin_password(admin.id, code, &password_hash, now)
            .await?;
        if applied {
            let revoked = self.revoke_all_sessions(PrincipalRef::admin(admin.id)).await?;
            info!(admin_id = admin.id, revoked, "Admin password reset");
        }
        Ok(applied)
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
