//! Authentication endpoints: register, login, role redirect, password reset

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        access::pages,
        user::{ForgotPassword, RegisterUser, ResetPassword, Role, User, VerifyOtp},
    },
    AppState,
};

use super::{AuthenticatedUser, Notice};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
    /// Page to show after login
    pub redirect: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RedirectResponse {
    pub redirect: String,
}

#[derive(Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    /// Single-use token for `/auth/reset-password`
    pub reset_token: String,
    pub message: String,
}

fn login_response(state: &AppState, token: String, user: User, redirect: &str) -> LoginResponse {
    LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours as i64 * 3600,
        user: user.into(),
        redirect: redirect.to_string(),
    }
}

/// Create an account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let (token, user) = state.services.users.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(login_response(&state, token, user, pages::HOME)),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&request.username, &request.password)
        .await?;

    let redirect = user.viewer().dashboard();
    Ok(Json(login_response(&state, token, user, redirect)))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = UserInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user.into()))
}

/// Dashboard page of the current user's role
#[utoipa::path(
    get,
    path = "/auth/redirect",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard path", body = RedirectResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn role_redirect(user: AuthenticatedUser) -> Json<RedirectResponse> {
    Json(RedirectResponse {
        redirect: user.viewer().dashboard().to_string(),
    })
}

/// Mail a password reset OTP
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPassword,
    responses(
        (status = 200, description = "OTP sent", body = Notice),
        (status = 404, description = "Email not registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPassword>,
) -> AppResult<Json<Notice>> {
    request.validate()?;
    state
        .services
        .users
        .request_password_reset(&request.email)
        .await?;

    Ok(Json(Notice::success(
        "An OTP has been sent to your email.",
        pages::VERIFY_OTP,
    )))
}

/// Exchange an OTP for a reset token
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtp,
    responses(
        (status = 200, description = "OTP accepted", body = VerifyOtpResponse),
        (status = 400, description = "Invalid or expired OTP", body = crate::error::ErrorResponse)
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtp>,
) -> AppResult<Json<VerifyOtpResponse>> {
    request.validate()?;
    let reset_token = state
        .services
        .users
        .verify_password_reset_otp(&request.email, &request.otp)
        .await?;

    Ok(Json(VerifyOtpResponse {
        reset_token,
        message: "OTP verified. You can now reset your password.".to_string(),
    }))
}

/// Set a new password
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPassword,
    responses(
        (status = 200, description = "Password changed", body = Notice),
        (status = 400, description = "Mismatch or missing verification", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPassword>,
) -> AppResult<Json<Notice>> {
    state.services.users.reset_password(request).await?;

    Ok(Json(Notice::success(
        "Password reset successful. Please log in.",
        pages::LOGIN,
    )))
}
