/// Church member endpoints
///
/// Memberships associate users with a church. Adding, updating, and
/// removing members requires the `pastor` church role (or admin); listing
/// is open to members of the church.
///
/// # Endpoints
///
/// - `POST /v1/churches/:church_id/members` - Add a user to the church
/// - `GET /v1/churches/:church_id/members` - List church members
/// - `PATCH /v1/churches/:church_id/members/:membership_id` - Update active flag/window
/// - `DELETE /v1/churches/:church_id/members/:membership_id` - Soft-delete a membership

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use anthem_shared::{
    auth::{
        authorization::{require_church_membership, require_church_role},
        middleware::AuthContext,
    },
    models::{
        member_role::ChurchRole,
        membership::{
            CreateMembership, Membership, MembershipWithUser, UpdateMembership,
        },
        user::User,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Optional explicit start of the active window
    pub since: Option<DateTime<Utc>>,
}

/// Update member request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// New active flag
    pub active: Option<bool>,

    /// New end of the active window
    pub until: Option<DateTime<Utc>>,
}

/// Removal acknowledgement
#[derive(Debug, Serialize)]
pub struct RemoveMemberResponse {
    /// Whether the membership was deactivated
    pub deactivated: bool,
}

/// Add a user to the church (pastor or admin)
///
/// # Errors
///
/// - `404 Not Found`: No such user
/// - `409 Conflict`: User is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Membership>> {
    require_church_role(&state.db, &auth, church_id, ChurchRole::Pastor).await?;

    // Reject unknown users up front for a clean 404
    User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let membership = Membership::create(
        &state.db,
        CreateMembership {
            church_id,
            user_id: req.user_id,
            since: req.since,
        },
    )
    .await?;

    Ok(Json(membership))
}

/// List church members with user info (members of the church)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MembershipWithUser>>> {
    require_church_membership(&state.db, &auth, church_id).await?;

    let members = Membership::list_by_church(&state.db, church_id).await?;

    Ok(Json(members))
}

/// Update a membership's active flag or window (pastor or admin)
///
/// # Errors
///
/// - `404 Not Found`: Membership doesn't exist or belongs to another church
pub async fn update_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((church_id, membership_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Json<Membership>> {
    require_church_role(&state.db, &auth, church_id, ChurchRole::Pastor).await?;

    // The membership must belong to the church in the path
    let existing = Membership::find_by_id(&state.db, membership_id)
        .await?
        .filter(|m| m.church_id == church_id)
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    let membership = Membership::update(
        &state.db,
        existing.id,
        UpdateMembership {
            active: req.active,
            until: req.until.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    Ok(Json(membership))
}

/// Soft-delete a membership (pastor or admin)
///
/// Deactivates the membership and closes its window; role history is kept.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((church_id, membership_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RemoveMemberResponse>> {
    require_church_role(&state.db, &auth, church_id, ChurchRole::Pastor).await?;

    let existing = Membership::find_by_id(&state.db, membership_id)
        .await?
        .filter(|m| m.church_id == church_id)
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))?;

    let deactivated = Membership::deactivate(&state.db, existing.id).await?;

    Ok(Json(RemoveMemberResponse { deactivated }))
}
