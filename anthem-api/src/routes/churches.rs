/// Church management endpoints
///
/// All endpoints require JWT authentication. Mutations are admin-only;
/// any authenticated user may browse churches.
///
/// # Endpoints
///
/// - `POST /v1/churches` - Create church (admin)
/// - `GET /v1/churches` - List churches
/// - `GET /v1/churches/:church_id` - Fetch one church
/// - `PATCH /v1/churches/:church_id` - Update a church (admin)
/// - `DELETE /v1/churches/:church_id` - Delete a church (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PaginationParams,
};
use anthem_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::church::{Church, CreateChurch, UpdateChurch},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create church request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChurchRequest {
    /// Church name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional street address
    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    /// Optional city
    #[validate(length(max = 128, message = "City must be at most 128 characters"))]
    pub city: Option<String>,
}

/// Update church request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChurchRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New address
    #[validate(length(max = 512, message = "Address must be at most 512 characters"))]
    pub address: Option<String>,

    /// New city
    #[validate(length(max = 128, message = "City must be at most 128 characters"))]
    pub city: Option<String>,
}

/// List churches response
#[derive(Debug, Serialize)]
pub struct ListChurchesResponse {
    /// Churches on this page
    pub churches: Vec<Church>,

    /// Total number of churches
    pub total: i64,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteChurchResponse {
    /// Whether the church was deleted
    pub deleted: bool,
}

/// Create a church (admin only)
pub async fn create_church(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateChurchRequest>,
) -> ApiResult<Json<Church>> {
    require_admin(&auth)?;

    req.validate().map_err(ApiError::from_validation)?;

    let church = Church::create(
        &state.db,
        CreateChurch {
            name: req.name,
            address: req.address,
            city: req.city,
        },
    )
    .await?;

    Ok(Json(church))
}

/// List churches with pagination
pub async fn list_churches(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<ListChurchesResponse>> {
    let churches = Church::list(&state.db, page.limit, page.offset).await?;
    let total = Church::count(&state.db).await?;

    Ok(Json(ListChurchesResponse { churches, total }))
}

/// Fetch one church
///
/// # Errors
///
/// - `404 Not Found`: No such church
pub async fn get_church(
    State(state): State<AppState>,
    Path(church_id): Path<Uuid>,
) -> ApiResult<Json<Church>> {
    let church = Church::find_by_id(&state.db, church_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Church not found".to_string()))?;

    Ok(Json(church))
}

/// Update a church (admin only)
pub async fn update_church(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
    Json(req): Json<UpdateChurchRequest>,
) -> ApiResult<Json<Church>> {
    require_admin(&auth)?;

    req.validate().map_err(ApiError::from_validation)?;

    let church = Church::update(
        &state.db,
        church_id,
        UpdateChurch {
            name: req.name,
            address: req.address.map(Some),
            city: req.city.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Church not found".to_string()))?;

    Ok(Json(church))
}

/// Delete a church (admin only)
///
/// Cascades to memberships and bands.
pub async fn delete_church(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(church_id): Path<Uuid>,
) -> ApiResult<Json<DeleteChurchResponse>> {
    require_admin(&auth)?;

    let deleted = Church::delete(&state.db, church_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Church not found".to_string()));
    }

    Ok(Json(DeleteChurchResponse { deleted }))
}
