//! Login, refresh, logout, and access-token verification.

use std::sync::Arc;

use tracing::{info, warn};

use herp_cache::CacheManager;
use herp_core::config::{AuthConfig, RateLimitConfig};
use herp_core::error::{AppError, ErrorKind, best_effort};
use herp_core::traits::Clock;
use herp_database::store::{AuditStore, PrincipalStore, RefreshTokenStore, RoleStore};
use herp_entity::audit::{CreateLoginHistory, LoginOutcome};
use herp_entity::principal::{Principal, PrincipalKind, PrincipalRef};
use herp_entity::session::TokenPair;

use crate::blacklist::Blacklist;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::mailer::Mailer;
use crate::password::{PasswordHasher, PasswordValidator};
use crate::rate_limit::{LoginThrottle, RateLimiter};
use crate::session::{RefreshTokenGenerator, SessionStore};

use super::types::{LoginRequest, LoginResult};

/// The persistence seams the auth core depends on.
#[derive(Clone)]
pub struct AuthStores {
    pub principals: Arc<dyn PrincipalStore>,
    pub roles: Arc<dyn RoleStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub audit: Arc<dyn AuditStore>,
}

impl AuthStores {
    /// Use one value for every seam.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PrincipalStore + RoleStore + RefreshTokenStore + AuditStore,
    {
        Self {
            principals: store.clone(),
            roles: store.clone(),
            refresh_tokens: store.clone(),
            audit: store,
        }
    }
}

/// Orchestrates every authentication operation.
#[derive(Clone)]
pub struct AuthService {
    pub(super) stores: AuthStores,
    pub(super) hasher: PasswordHasher,
    pub(super) validator: PasswordValidator,
    pub(super) encoder: JwtEncoder,
    pub(super) decoder: JwtDecoder,
    pub(super) sessions: SessionStore,
    pub(super) blacklist: Blacklist,
    pub(super) limiter: RateLimiter,
    pub(super) throttle: LoginThrottle,
    pub(super) mailer: Arc<dyn Mailer>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) config: AuthConfig,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("encoder", &self.encoder)
            .field("sessions", &self.sessions)
            .field("mailer", &self.mailer)
            .finish()
    }
}

impl AuthService {
    /// Build the service from immutable configuration.
    pub fn new(
        auth: &AuthConfig,
        rate_limit: &RateLimitConfig,
        stores: AuthStores,
        cache: Arc<CacheManager>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        if auth.uses_placeholder_secret() {
            warn!("auth.jwt_secret is unset or the placeholder; set HERP__AUTH__JWT_SECRET before exposing this server");
        }
        if !auth.has_dedicated_refresh_secret() {
            warn!("auth.jwt_refresh_secret is not set; refresh tokens are peppered with the access-token secret");
        }
        info!(
            access_ttl_secs = auth.access_ttl().as_secs(),
            refresh_ttl_secs = auth.refresh_ttl().as_secs(),
            "Auth service configured"
        );

        let limiter = RateLimiter::new(cache.clone(), clock.clone());
        let sessions = SessionStore::new(
            stores.refresh_tokens.clone(),
            RefreshTokenGenerator::new(auth.refresh_secret()),
            auth.refresh_ttl(),
            clock.clone(),
        );

        Ok(Self {
            hasher: PasswordHasher::from_config(auth)?,
            validator: PasswordValidator::new(auth),
            encoder: JwtEncoder::new(auth, clock.clone()),
            decoder: JwtDecoder::new(auth, clock.clone()),
            sessions,
            blacklist: Blacklist::new(cache),
            throttle: LoginThrottle::new(limiter.clone(), rate_limit.clone()),
            limiter,
            stores,
            mailer,
            clock,
            config: auth.clone(),
        })
    }

    /// Authenticate a user or admin and issue a token pair.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResult, AppError> {
        let identifier = request.identifier.trim();
        let ip = request.ip_address.as_deref();

        if let Err(e) = self.throttle.gate(identifier, ip).await {
            if e.kind == ErrorKind::RateLimited {
                warn!(identifier = %identifier, ip = ?ip, "Login rejected by rate limit");
                self.record_login(&request, None, LoginOutcome::RateLimited).await;
            }
            return Err(e);
        }

        let Some(principal) = self.resolve_principal(identifier).await? else {
            self.throttle.record_failure(identifier, ip).await?;
            self.record_login(&request, None, LoginOutcome::UnknownIdentifier)
                .await;
            return Err(AppError::invalid_credentials());
        };

        if !principal.is_active() {
            info!(principal = %principal.reference(), "Login attempt on inactive account");
            self.record_login(&request, Some(&principal), LoginOutcome::Inactive)
                .await;
            return Err(AppError::user_inactive());
        }

        if !self
            .verify_password(principal.password_hash(), &request.password)
            .await?
        {
            self.throttle.record_failure(identifier, ip).await?;
            self.record_login(&request, Some(&principal), LoginOutcome::WrongPassword)
                .await;
            return Err(AppError::invalid_credentials());
        }

        self.throttle.record_success(identifier).await?;
        let permissions = self.stores.roles.permission_codes(principal.role_id()).await?;
        let tokens = self.issue_pair(&principal, permissions).await?;
        self.record_login(&request, Some(&principal), LoginOutcome::Success)
            .await;

        info!(
            principal = %principal.reference(),
            ip = ?ip,
            "Login successful"
        );
        Ok(LoginResult { tokens, principal })
    }

    /// Exchange a refresh token for a new pair, revoking the old token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let row = match self.sessions.lookup(refresh_token).await {
            Ok(row) => row,
            Err(e) if e.kind == ErrorKind::NotFound => {
                return Err(AppError::invalid_credentials());
            }
            Err(e) => return Err(e),
        };

        let principal = self
            .load_principal(row.principal())
            .await?
            .ok_or_else(AppError::invalid_credentials)?;
        if !principal.is_active() {
            return Err(AppError::user_inactive());
        }

        let permissions = self.stores.roles.permission_codes(principal.role_id()).await?;
        let tokens = self.issue_pair(&principal, permissions).await?;

        best_effort(
            "revoke_rotated_refresh_token",
            self.sessions.revoke(refresh_token),
        )
        .await;

        info!(principal = %principal.reference(), token_id = row.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// Blacklist an access token for the rest of its lifetime.
    ///
    /// The token must carry a valid signature but may already be expired,
    /// in which case nothing is stored.
    pub async fn logout(&self, access_token: &str) -> Result<Claims, AppError> {
        let claims = self.decoder.decode_signed(access_token)?;
        if let Some(remaining) = self.decoder.remaining_validity(&claims) {
            self.blacklist.block(access_token, remaining).await?;
        }
        info!(principal = %claims.principal(), "Logged out");
        Ok(claims)
    }

    /// Revoke every refresh token of the caller and blacklist the presented
    /// access token. Returns the number of sessions revoked.
    pub async fn logout_all(&self, access_token: &str) -> Result<u64, AppError> {
        let claims = self.verify_access(access_token).await?;
        let revoked = self.revoke_all_sessions(claims.principal()).await?;
        self.logout(access_token).await?;
        Ok(revoked)
    }

    /// Revoke every refresh token of `principal`.
    pub async fn revoke_all_sessions(&self, principal: PrincipalRef) -> Result<u64, AppError> {
        self.sessions.revoke_all(principal).await
    }

    /// Verify an access token and reject it if it was logged out.
    pub async fn verify_access(&self, access_token: &str) -> Result<Claims, AppError> {
        let claims = self.decoder.verify(access_token)?;
        if self.blacklist.is_blocked(access_token).await? {
            return Err(AppError::token_blacklisted());
        }
        Ok(claims)
    }

    pub fn has_permission(&self, claims: &Claims, code: &str) -> bool {
        claims.has_permission(code)
    }

    /// `Forbidden` unless `claims` carries `code`.
    pub fn require_permission(&self, claims: &Claims, code: &str) -> Result<(), AppError> {
        if self.has_permission(claims, code) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Missing permission: {code}")))
        }
    }

    /// Delete expired and revoked refresh tokens.
    pub async fn sweep_sessions(&self) -> Result<u64, AppError> {
        self.sessions.sweep().await
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn validator(&self) -> &PasswordValidator {
        &self.validator
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Hash off the async runtime; bcrypt at production cost is slow.
    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Hashing task failed", e))?
    }

    pub(super) async fn verify_password(&self, hash: &str, password: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let hash = hash.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Verification task failed", e))?
    }

    /// Users before admins, email before username; first match wins.
    async fn resolve_principal(&self, identifier: &str) -> Result<Option<Principal>, AppError> {
        let principals = &self.stores.principals;
        if let Some(user) = principals.find_user_by_email(identifier).await? {
            return Ok(Some(Principal::User(user)));
        }
        if let Some(user) = principals.find_user_by_username(identifier).await? {
            return Ok(Some(Principal::User(user)));
        }
        if let Some(admin) = principals.find_admin_by_email(identifier).await? {
            return Ok(Some(Principal::Admin(admin)));
        }
        if let Some(admin) = principals.find_admin_by_username(identifier).await? {
            return Ok(Some(Principal::Admin(admin)));
        }
        Ok(None)
    }

    async fn load_principal(&self, reference: PrincipalRef) -> Result<Option<Principal>, AppError> {
        let principals = &self.stores.principals;
        Ok(match reference.kind {
            PrincipalKind::User => principals
                .find_user_by_id(reference.id)
                .await?
                .map(Principal::User),
            PrincipalKind::Admin => principals
                .find_admin_by_id(reference.id)
                .await?
                .map(Principal::Admin),
        })
    }

    async fn issue_pair(
        &self,
        principal: &Principal,
        permissions: Vec<String>,
    ) -> Result<TokenPair, AppError> {
        let access = self.encoder.issue_access(principal, permissions)?;
        let refresh = self.sessions.issue(principal.reference()).await?;
        Ok(TokenPair {
            access_token: access.token.clone(),
            refresh_token: refresh.token,
            expires_at: access.expires_at(),
            expires_in: self.encoder.access_ttl().as_secs() as i64,
        })
    }

    async fn record_login(
        &self,
        request: &LoginRequest,
        principal: Option<&Principal>,
        outcome: LoginOutcome,
    ) {
        let entry = CreateLoginHistory {
            principal_kind: principal.map(Principal::kind),
            principal_id: principal.map(Principal::id),
            identifier: request.identifier.trim().to_string(),
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
            outcome,
        };
        best_effort("record_login", self.stores.audit.record_login(entry)).await;
    }
}
