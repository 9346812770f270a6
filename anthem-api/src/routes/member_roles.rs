/// Church member role endpoints
///
/// Role assignments are dated: assigning opens a new assignment, removing
/// one stamps `ended_at` rather than deleting the row. At most one open
/// assignment per role per membership — a second assignment of the same
/// role answers 409.
///
/// # Endpoints
///
/// - `POST /v1/churches/:church_id/members/:membership_id/roles` - Assign a role
/// - `GET /v1/churches/:church_id/members/:membership_id/roles` - List assignments
/// - `DELETE /v1/churches/:church_id/members/:membership_id/roles/:role_id` - End an assignment

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
        member_role::{ChurchRole, CreateMemberRole, MemberRole},
        membership::Membership,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assign role request
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    /// Role to assign
    pub role: ChurchRole,

    /// Optional explicit start (defaults to now)
    pub started_at: Option<DateTime<Utc>>,
}

/// End-of-assignment acknowledgement
#[derive(Debug, Serialize)]
pub struct EndRoleResponse {
    /// Whether an open assignment was ended
    pub ended: bool,
}

/// Loads a membership and checks it belongs to the church in the path
async fn membership_in_church(
    state: &AppState,
    church_id: Uuid,
    membership_id: Uuid,
) -> ApiResult<Membership> {
    Membership::find_by_id(&state.db, membership_id)
        .await?
        .filter(|m| m.church_id == church_id)
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))
}

/// Assign a role to a membership (pastor or admin)
///
/// # Errors
///
/// - `404 Not Found`: Membership doesn't exist in this church
/// - `409 Conflict`: The membership already holds an open assignment of
///   this role
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((church_id, membership_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AssignRoleRequest>,
) -> ApiResult<Json<MemberRole>> {
    require_church_role(&state.db, &auth, church_id, ChurchRole::Pastor).await?;

    let membership = membership_in_church(&state, church_id, membership_id).await?;

    // Open-assignment uniqueness lives here, not in the schema
    if MemberRole::has_open_role(&state.db, membership.id, req.role).await? {
        return Err(ApiError::Conflict(format!(
            "Membership already holds an open {} assignment",
            req.role.as_str()
        )));
    }

    let member_role = MemberRole::create(
        &state.db,
        CreateMemberRole {
            membership_id: membership.id,
            role: req.role,
            started_at: req.started_at,
        },
    )
    .await?;

    Ok(Json(member_role))
}

/// List a membership's role assignments (members of the church)
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((church_id, membership_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<MemberRole>>> {
    require_church_membership(&state.db, &auth, church_id).await?;

    let membership = membership_in_church(&state, church_id, membership_id).await?;

    let roles = MemberRole::list_by_membership(&state.db, membership.id).await?;

    Ok(Json(roles))
}

/// End a role assignment (pastor or admin)
///
/// Stamps `ended_at`; the assignment stays in the history.
///
/// # Errors
///
/// - `404 Not Found`: Assignment doesn't exist on this membership, or is
///   already ended
pub async fn end_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((church_id, membership_id, role_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<EndRoleResponse>> {
    require_church_role(&state.db, &auth, church_id, ChurchRole::Pastor).await?;

    let membership = membership_in_church(&state, church_id, membership_id).await?;

    // The assignment must hang off the membership in the path
    let assignment = MemberRole::find_by_id(&state.db, role_id)
        .await?
        .filter(|r| r.membership_id == membership.id)
        .ok_or_else(|| ApiError::NotFound("Role assignment not found".to_string()))?;

    let ended = MemberRole::end(&state.db, assignment.id).await?;

    if !ended {
        return Err(ApiError::NotFound(
            "Role assignment is already ended".to_string(),
        ));
    }

    Ok(Json(EndRoleResponse { ended }))
}
