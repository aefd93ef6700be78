//! `AuthUser` and `BearerToken` extractors.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use herp_auth::Claims;
use herp_core::error::AppError;
use herp_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::client::ClientInfo;
use crate::state::AppState;

/// The raw bearer token from the `Authorization` header, unverified.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Pull the token out of request headers.
    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        Ok(Self(token.to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts)?)
    }
}

/// Authenticated caller available in handlers.
///
/// Reuses the claims placed in request extensions by the auth middleware
/// and verifies the bearer token itself otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub context: RequestContext,
    pub claims: Claims,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = match parts.extensions.get::<Claims>() {
            Some(claims) => claims.clone(),
            None => {
                let BearerToken(token) = BearerToken::from_parts(parts)?;
                state.auth.verify_access(&token).await?
            }
        };

        let Ok(client) = ClientInfo::from_request_parts(parts, state).await;
        let context = RequestContext::from_claims(&claims, client.ip, client.user_agent);

        Ok(Self { context, claims })
    }
}
