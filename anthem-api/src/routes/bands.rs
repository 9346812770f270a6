/// Band endpoints
///
/// Bands belong to a church. Any active church member may create one; the
/// creator (or an admin) manages it afterwards. Band members are managed
/// by the creator or admin.
///
/// # Endpoints
///
/// - `POST /v1/churches/:church_id/bands` - Create band (church member)
/// - `GET /v1/churches/:church_id/bands` - List the church's bands
/// - `GET /v1/bands/:band_id` - Fetch one band with members
/// - `PATCH /v1/bands/:band_id` - Rename (creator or admin)
/// - `DELETE /v1/bands/:band_id` - Delete (creator or admin)
/// - `POST /v1/bands/:band_id/members` - Add member (creator or admin)
/// - `GET /v1/bands/:band_id/members` - List members (band access)
/// - `DELETE /v1/bands/:band_id/members/:user_id` - Remove member (creator or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use anthem_shared::{
    auth::{
        authorization::{require_band_access, require_church_membership},
        middleware::AuthContext,
    },
    models::band::{
        Band, BandMember, BandMemberWithUser, CreateBand, CreateBandMember,
    },
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create band request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBandRequest {
    /// Band name (unique within the church)
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Update band request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBandRequest {
    /// New band name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Add band member request
#[derive(Debug, Deserialize, Validate)]
pub struct AddBandMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Optional instrument
    #[validate(length(max = 64, message = "Instrument must be at most 64 characters"))]
    pub instrument: Option<String>,
}

/// Band with its member list
#[derive(Debug, Serialize)]
pub struct BandDetailResponse {
    /// The band
    #[serde(flatten)]
    pub band: Band,

    /// Band members with user info
    pub members: Vec<BandMemberWithUser>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteBandResponse {
    /// Whether the band was deleted
    pub deleted: bool,
}

/// Removal acknowledgement
#[derive(Debug, Serialize)]
pub struct RemoveBandMemberResponse {
    /// Whether the member was removed
    pub removed: bool,
}

/// Requires the authenticated user to be the band creator or an admin
fn require_band_manager(auth: &AuthContext, band: &Band) -> ApiResult<()> {
    if auth.is_admin() || band.created_by == auth.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the band creator may manage this band".to_string(),
        ))
    }
}

/// Create a band in a church (active church member)
///
/// The creator is automatically the first member.
///
/// # Errors
///
/// - `403 Forbidden`: Not an active member of the church
/// - `409 Conflict`: Band name already taken in this church
pub async fn create_band(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
    Json(req): Json<CreateBandRequest>,
) -> ApiResult<Json<Band>> {
    require_church_membership(&state.db, &auth, church_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let band = Band::create(
        &state.db,
        CreateBand {
            church_id,
            name: req.name,
            created_by: auth.user_id,
        },
    )
    .await?;

    Ok(Json(band))
}

/// List a church's bands (members of the church)
pub async fn list_church_bands(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Band>>> {
    require_church_membership(&state.db, &auth, church_id).await?;

    let bands = Band::list_by_church(&state.db, church_id).await?;

    Ok(Json(bands))
}

/// Fetch one band with its member list (band access)
///
/// # Errors
///
/// - `404 Not Found`: No such band
pub async fn get_band(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
) -> ApiResult<Json<BandDetailResponse>> {
    require_band_access(&state.db, &auth, band_id).await?;

    let band = Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    let members = BandMember::list_by_band(&state.db, band_id).await?;

    Ok(Json(BandDetailResponse { band, members }))
}

/// Rename a band (creator or admin)
pub async fn update_band(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Json(req): Json<UpdateBandRequest>,
) -> ApiResult<Json<Band>> {
    let band = Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    require_band_manager(&auth, &band)?;

    req.validate().map_err(ApiError::from_validation)?;

    let band = Band::rename(&state.db, band_id, req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    Ok(Json(band))
}

/// Delete a band (creator or admin)
///
/// Cascades to members, songs, and events.
pub async fn delete_band(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
) -> ApiResult<Json<DeleteBandResponse>> {
    let band = Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    require_band_manager(&auth, &band)?;

    let deleted = Band::delete(&state.db, band_id).await?;

    Ok(Json(DeleteBandResponse { deleted }))
}

/// Add a member to a band (creator or admin)
///
/// The new member must hold an active membership in the band's church.
///
/// # Errors
///
/// - `400 Bad Request`: The user is not a member of the band's church
/// - `409 Conflict`: The user is already in the band
pub async fn add_band_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Json(req): Json<AddBandMemberRequest>,
) -> ApiResult<Json<BandMember>> {
    let band = Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    require_band_manager(&auth, &band)?;

    req.validate().map_err(ApiError::from_validation)?;

    // Band members come from the congregation
    let in_church = anthem_shared::models::membership::Membership::is_active_member(
        &state.db,
        band.church_id,
        req.user_id,
    )
    .await?;

    if !in_church {
        return Err(ApiError::BadRequest(
            "User is not an active member of this band's church".to_string(),
        ));
    }

    let member = BandMember::create(
        &state.db,
        CreateBandMember {
            band_id,
            user_id: req.user_id,
            instrument: req.instrument,
        },
    )
    .await?;

    Ok(Json(member))
}

/// List a band's members with user info (band access)
pub async fn list_band_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
) -> ApiResult<Json<Vec<BandMemberWithUser>>> {
    require_band_access(&state.db, &auth, band_id).await?;

    let members = BandMember::list_by_band(&state.db, band_id).await?;

    Ok(Json(members))
}

/// Remove a member from a band (creator or admin)
pub async fn remove_band_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((band_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RemoveBandMemberResponse>> {
    let band = Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    require_band_manager(&auth, &band)?;

    let removed = BandMember::remove(&state.db, band_id, user_id).await?;

    if !removed {
        return Err(ApiError::NotFound("Band member not found".to_string()));
    }

    Ok(Json(RemoveBandMemberResponse { removed }))
}
