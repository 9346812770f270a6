/// User management endpoints
///
/// All endpoints require JWT authentication. Listing is admin-only; the
/// remaining endpoints allow a user to act on their own account, or an
/// admin to act on anyone's.
///
/// # Endpoints
///
/// - `GET /v1/users` - List users (admin)
/// - `GET /v1/users/:user_id` - Fetch one user
/// - `PATCH /v1/users/:user_id` - Update a user
/// - `DELETE /v1/users/:user_id` - Soft-delete a user
/// - `GET /v1/users/:user_id/memberships` - The user's church memberships
/// - `GET /v1/users/:user_id/subscriptions` - The user's band subscriptions

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::PaginationParams,
};
use anthem_shared::{
    auth::{
        authorization::{require_admin, require_self_or_admin},
        middleware::AuthContext,
        password,
    },
    models::{
        membership::{Membership, MembershipWithChurch},
        subscription::{Subscription, SubscriptionWithBand},
        user::{AppRole, UpdateUser, User, UserStatus},
    },
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Update user request
///
/// Absent fields are left unchanged. Status and role changes require the
/// admin app role.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New email address (resets verification)
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// New phone number (resets verification)
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    /// New password
    pub password: Option<String>,

    /// New account status (admin only)
    pub status: Option<UserStatus>,

    /// New application role (admin only)
    pub role: Option<AppRole>,
}

/// List users response
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// Users on this page
    pub users: Vec<User>,

    /// Total number of users
    pub total: i64,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    /// Whether the account was deactivated
    pub deactivated: bool,
}

/// List users with pagination (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<ListUsersResponse>> {
    require_admin(&auth)?;

    let users = User::list(&state.db, page.limit, page.offset).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(ListUsersResponse { users, total }))
}

/// Fetch one user (self or admin)
///
/// # Errors
///
/// - `403 Forbidden`: Acting on another user without admin role
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    require_self_or_admin(&auth, user_id)?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update a user (self or admin)
///
/// # Errors
///
/// - `403 Forbidden`: Changing status/role without admin, or acting on
///   another user
/// - `409 Conflict`: New email already exists
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    require_self_or_admin(&auth, user_id)?;

    req.validate().map_err(ApiError::from_validation)?;

    // Status and role are admin-only fields
    if (req.status.is_some() || req.role.is_some()) && !auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Only administrators may change status or role".to_string(),
        ));
    }

    // A new password goes through the same strength gate as registration
    let password_hash = match req.password {
        Some(ref new_password) => {
            password::validate_password_strength(new_password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            email: req.email,
            password_hash,
            name: req.name.map(Some),
            phone: req.phone.map(Some),
            status: req.status,
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Soft-delete a user (self or admin)
///
/// Sets the account status to inactive; the row is kept.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    require_self_or_admin(&auth, user_id)?;

    let deactivated = User::deactivate(&state.db, user_id).await?;

    if !deactivated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(DeleteUserResponse { deactivated }))
}

/// List the user's church memberships with church info (self or admin)
pub async fn list_user_memberships(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MembershipWithChurch>>> {
    require_self_or_admin(&auth, user_id)?;

    let memberships = Membership::list_by_user(&state.db, user_id).await?;

    Ok(Json(memberships))
}

/// List the user's active band subscriptions (self or admin)
pub async fn list_user_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SubscriptionWithBand>>> {
    require_self_or_admin(&auth, user_id)?;

    let subscriptions = Subscription::list_by_user(&state.db, user_id).await?;

    Ok(Json(subscriptions))
}
