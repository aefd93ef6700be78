//! Auth handlers: login, registration, email verification, password reset,
//! refresh, logout, and me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use herp_auth::{LoginRequest, RegisterAdmin};
use herp_core::error::AppError;
use herp_entity::principal::Admin;
use herp_entity::session::TokenPair;

use crate::dto::request::{
    ForgotPasswordBody, LoginBody, RefreshBody, RegisterBody, ResetPasswordBody, VerifyEmailBody,
};
use crate::dto::response::{
    ApiResponse, LoginResponse, MeResponse, MessageResponse, RevokedResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, BearerToken, ClientInfo, ValidatedJson};
use crate::state::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(body): ValidatedJson<LoginBody>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let identifier = body
        .identifier()
        .ok_or_else(|| AppError::validation("Either email or username must be provided"))?;

    let request = LoginRequest::new(identifier, body.password.as_str())
        .from_client(client.ip, client.user_agent);
    let result = state.auth.login(request).await?;

    Ok(Json(ApiResponse::ok(result.into())))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterBody>,
) -> Result<(StatusCode, Json<ApiResponse<Admin>>), ApiError> {
    let admin = state
        .auth
        .register_admin(RegisterAdmin {
            username: body.username,
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(admin))))
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<VerifyEmailBody>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !state.auth.verify_email(&body.email, &body.code).await? {
        return Err(AppError::validation("Invalid or expired code").into());
    }
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Email verified successfully",
    ))))
}

/// POST /api/v1/auth/forgot-password
///
/// Answers the same way whether or not the address is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ForgotPasswordBody>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth.forgot_password(&body.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "If the email is registered, a reset code has been sent",
    ))))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ResetPasswordBody>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let applied = state
        .auth
        .reset_password(&body.email, &body.code, &body.new_password)
        .await?;
    if !applied {
        return Err(AppError::validation("Invalid or expired code").into());
    }
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset",
    ))))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshBody>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let tokens = state.auth.refresh(&body.refresh_token).await?;
    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth.logout(&token).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

/// POST /api/v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<RevokedResponse>>, ApiError> {
    let revoked = state.auth.logout_all(&token).await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}

/// GET /api/v1/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse::from(&auth.claims)))
}
