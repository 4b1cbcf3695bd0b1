//! Authentication handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::ValidatedJson;
use crate::models::{AdminRow, BusinessRow};
use crate::services::auth::AuthToken;
use crate::services::{AuthService, Notification};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    #[validate(length(min = 1, message = "Email address is required"))]
    pub email_address: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse<T> {
    pub message: String,
    pub user: T,
    pub token: AuthToken,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email_address: String,
    pub otp: String,
    pub password: String,
}

/// Business login
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse<BusinessRow>>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let (business, token) = auth_service
        .login_user(&body.email_address, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: business,
        token,
    }))
}

/// Administrator login
pub async fn login_admin(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse<AdminRow>>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let (admin, token) = auth_service
        .login_admin(&body.email_address, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: admin,
        token,
    }))
}

/// Email a one-time reset code
pub async fn forgot_password_send(
    State(state): State<AppState>,
    Path(email_address): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let issued = auth_service.issue_otp(&email_address).await?;

    state.notifier.dispatch(
        &issued.business.email_address,
        Notification::PasswordResetCode {
            otp: issued.otp,
            expiry_minutes: issued.expiry_minutes,
        },
    );

    Ok(MessageResponse::new("OTP sent to your email address"))
}

pub async fn forgot_password_verify(
    State(state): State<AppState>,
    Path((email_address, otp)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.verify_otp(&email_address, &otp).await?;
    Ok(MessageResponse::new("OTP verified"))
}

/// Replace the password once the reset code checks out
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service
        .reset_password(&body.email_address, &body.otp, &body.password)
        .await?;
    Ok(MessageResponse::new("Password updated successfully"))
}
