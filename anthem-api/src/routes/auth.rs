/// Authentication endpoints
///
/// Registration, login, token refresh, and the temporal-token flows:
/// email verification, password reset, and WhatsApp phone verification.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/verify-email` - Redeem an email verification token
/// - `POST /v1/auth/verify-email/request` - Re-issue a verification token (authenticated)
/// - `POST /v1/auth/password-reset/request` - Request a reset token by email
/// - `POST /v1/auth/password-reset/confirm` - Redeem a reset token
/// - `POST /v1/auth/phone/request` - Store a phone number, send a WhatsApp code (authenticated)
/// - `POST /v1/auth/phone/verify` - Redeem a phone verification token (authenticated)
///
/// Outbound deliveries are raced against a fixed delay and never fail the
/// request that triggered them.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use anthem_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{
        temporal_token::{TemporalToken, TokenPurpose},
        user::{CreateUser, UpdateUser, User},
    },
    notify::{Notification, NotificationChannel, Notifier as _},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// How long an outbound delivery may take before the request stops waiting
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// Optional phone number
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Token redemption request (email/phone verification)
#[derive(Debug, Deserialize)]
pub struct RedeemTokenRequest {
    /// The token secret delivered out-of-band
    pub token: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    /// Email address the account is registered under
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    /// The reset token secret
    pub token: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Phone link request
#[derive(Debug, Deserialize, Validate)]
pub struct PhoneLinkRequest {
    /// Phone number to link (E.164)
    #[validate(length(min = 5, max = 32, message = "Phone must be 5-32 characters"))]
    pub phone: String,
}

/// Generic acknowledgement response
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Human-readable outcome
    pub message: String,
}

/// Hands a notification to the transport, bounded by a fixed delay
///
/// Delivery failure or timeout is logged and swallowed: it never rolls back
/// the write that triggered it.
async fn notify_best_effort(state: &AppState, notification: Notification) {
    match tokio::time::timeout(NOTIFY_TIMEOUT, state.notifier.send(notification)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!("Notification delivery failed: {}", e);
        }
        Err(_) => {
            tracing::warn!(
                "Notification delivery timed out after {:?}",
                NOTIFY_TIMEOUT
            );
        }
    }
}

/// Register a new user
///
/// Creates the account, issues an email verification token, and returns
/// JWT tokens. Verification email delivery is best-effort.
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    // Validate request
    req.validate().map_err(ApiError::from_validation)?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    // Create user
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            name: req.name.clone(),
            phone: req.phone.clone(),
        },
    )
    .await?;

    // Issue an email verification token and deliver it best-effort
    let (secret, _token) =
        TemporalToken::issue(&state.db, user.id, TokenPurpose::EmailVerification).await?;

    notify_best_effort(
        &state,
        Notification {
            channel: NotificationChannel::Email {
                to: user.email.clone(),
            },
            subject: "Verify your Anthem email".to_string(),
            body: format!("Your email verification token: {}", secret),
        },
    )
    .await;

    // Generate tokens
    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// Authenticates a user and returns JWT tokens. Inactive (soft-deleted)
/// accounts are rejected.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials or inactive account
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    // Validate request
    req.validate().map_err(ApiError::from_validation)?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // Soft-deleted accounts cannot log in
    if !user.is_active() {
        return Err(ApiError::Unauthorized(
            "Account has been deactivated".to_string(),
        ));
    }

    // Update last login
    User::update_last_login(&state.db, user.id).await?;

    // Generate tokens
    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Redeems an email verification token
///
/// # Errors
///
/// - `400 Bad Request`: Token is invalid, expired, or already used
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<RedeemTokenRequest>,
) -> ApiResult<Json<AckResponse>> {
    let token = TemporalToken::redeem(&state.db, &req.token, TokenPurpose::EmailVerification)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired verification token".to_string())
        })?;

    User::mark_email_verified(&state.db, token.user_id).await?;

    Ok(Json(AckResponse {
        message: "Email verified".to_string(),
    }))
}

/// Re-issues an email verification token for the logged-in account
pub async fn request_email_verification(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AckResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.email_verified {
        return Err(ApiError::BadRequest("Email is already verified".to_string()));
    }

    let (secret, _token) =
        TemporalToken::issue(&state.db, user.id, TokenPurpose::EmailVerification).await?;

    notify_best_effort(
        &state,
        Notification {
            channel: NotificationChannel::Email {
                to: user.email.clone(),
            },
            subject: "Verify your Anthem email".to_string(),
            body: format!("Your email verification token: {}", secret),
        },
    )
    .await;

    Ok(Json(AckResponse {
        message: "Verification email sent".to_string(),
    }))
}

/// Requests a password reset token by email
///
/// Always answers 200 so the endpoint cannot be used to probe which emails
/// have accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    if let Some(user) = User::find_by_email(&state.db, &req.email).await? {
        let (secret, _token) =
            TemporalToken::issue(&state.db, user.id, TokenPurpose::PasswordReset).await?;

        notify_best_effort(
            &state,
            Notification {
                channel: NotificationChannel::Email {
                    to: user.email.clone(),
                },
                subject: "Reset your Anthem password".to_string(),
                body: format!("Your password reset token: {}", secret),
            },
        )
        .await;
    }

    Ok(Json(AckResponse {
        message: "If the email is registered, a reset token has been sent".to_string(),
    }))
}

/// Redeems a password reset token and sets a new password
///
/// # Errors
///
/// - `400 Bad Request`: Token is invalid, expired, or already used
/// - `422 Unprocessable Entity`: New password is too weak
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let token = TemporalToken::redeem(&state.db, &req.token, TokenPurpose::PasswordReset)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

    let password_hash = password::hash_password(&req.new_password)?;

    User::update(
        &state.db,
        token.user_id,
        UpdateUser {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(AckResponse {
        message: "Password updated".to_string(),
    }))
}

/// Stores a phone number on the account and sends a WhatsApp code
pub async fn request_phone_link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<PhoneLinkRequest>,
) -> ApiResult<Json<AckResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            phone: Some(Some(req.phone.clone())),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let (secret, _token) =
        TemporalToken::issue(&state.db, user.id, TokenPurpose::PhoneVerification).await?;

    notify_best_effort(
        &state,
        Notification {
            channel: NotificationChannel::Whatsapp {
                phone: req.phone.clone(),
            },
            subject: "Anthem phone verification".to_string(),
            body: format!("Your phone verification token: {}", secret),
        },
    )
    .await;

    Ok(Json(AckResponse {
        message: "Verification code sent over WhatsApp".to_string(),
    }))
}

/// Redeems a phone verification token for the logged-in account
///
/// # Errors
///
/// - `400 Bad Request`: Token is invalid, expired, used, or belongs to
///   another account
pub async fn verify_phone(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RedeemTokenRequest>,
) -> ApiResult<Json<AckResponse>> {
    let token = TemporalToken::redeem(&state.db, &req.token, TokenPurpose::PhoneVerification)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired verification token".to_string())
        })?;

    // The code must have been issued to the account redeeming it
    if token.user_id != auth.user_id {
        return Err(ApiError::BadRequest(
            "Invalid or expired verification token".to_string(),
        ));
    }

    User::mark_phone_verified(&state.db, token.user_id).await?;

    Ok(Json(AckResponse {
        message: "Phone verified".to_string(),
    }))
}
