/// Lyric endpoints
///
/// Lyric sections are an ordered sublist of a song. Position uniqueness is
/// enforced here, not in the schema: inserting at or moving to an occupied
/// position answers 409.
///
/// # Endpoints
///
/// - `POST /v1/songs/:song_id/lyrics` - Insert a section at a position
/// - `GET /v1/songs/:song_id/lyrics` - List sections ordered by position
/// - `PATCH /v1/songs/:song_id/lyrics/:lyric_id` - Edit or move a section
/// - `DELETE /v1/songs/:song_id/lyrics/:lyric_id` - Delete a section

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::songs::song_with_access,
};
use anthem_shared::{
    auth::middleware::AuthContext,
    models::lyric::{CreateLyric, Lyric, UpdateLyric},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create lyric request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLyricRequest {
    /// Position within the song
    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: i32,

    /// Optional section heading (e.g. "Chorus")
    #[validate(length(max = 64, message = "Heading must be at most 64 characters"))]
    pub heading: Option<String>,

    /// Section text
    #[validate(length(min = 1, message = "Body must not be empty"))]
    pub body: String,
}

/// Update lyric request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLyricRequest {
    /// New position
    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: Option<i32>,

    /// New heading
    #[validate(length(max = 64, message = "Heading must be at most 64 characters"))]
    pub heading: Option<String>,

    /// New section text
    #[validate(length(min = 1, message = "Body must not be empty"))]
    pub body: Option<String>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteLyricResponse {
    /// Whether the section was deleted
    pub deleted: bool,
}

/// Insert a lyric section (band access)
///
/// # Errors
///
/// - `409 Conflict`: Position already occupied in this song
pub async fn create_lyric(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
    Json(req): Json<CreateLyricRequest>,
) -> ApiResult<Json<Lyric>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    // Position uniqueness is application-enforced
    if Lyric::position_taken(&state.db, song.id, req.position, None).await? {
        return Err(ApiError::Conflict(format!(
            "Position {} is already occupied",
            req.position
        )));
    }

    let lyric = Lyric::create(
        &state.db,
        CreateLyric {
            song_id: song.id,
            position: req.position,
            heading: req.heading,
            body: req.body,
        },
    )
    .await?;

    Ok(Json(lyric))
}

/// List a song's lyric sections ordered by position (band access)
pub async fn list_lyrics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Lyric>>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    let lyrics = Lyric::list_by_song(&state.db, song.id).await?;

    Ok(Json(lyrics))
}

/// Edit or move a lyric section (band access)
///
/// # Errors
///
/// - `404 Not Found`: Section doesn't exist on this song
/// - `409 Conflict`: Target position already occupied
pub async fn update_lyric(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((song_id, lyric_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateLyricRequest>,
) -> ApiResult<Json<Lyric>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    // The section must belong to the song in the path
    let existing = Lyric::find_by_id(&state.db, lyric_id)
        .await?
        .filter(|l| l.song_id == song.id)
        .ok_or_else(|| ApiError::NotFound("Lyric not found".to_string()))?;

    if let Some(position) = req.position {
        if Lyric::position_taken(&state.db, song.id, position, Some(existing.id)).await? {
            return Err(ApiError::Conflict(format!(
                "Position {} is already occupied",
                position
            )));
        }
    }

    let lyric = Lyric::update(
        &state.db,
        existing.id,
        UpdateLyric {
            position: req.position,
            heading: req.heading.map(Some),
            body: req.body,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Lyric not found".to_string()))?;

    Ok(Json(lyric))
}

/// Delete a lyric section (band access)
pub async fn delete_lyric(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((song_id, lyric_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteLyricResponse>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    let existing = Lyric::find_by_id(&state.db, lyric_id)
        .await?
        .filter(|l| l.song_id == song.id)
        .ok_or_else(|| ApiError::NotFound("Lyric not found".to_string()))?;

    let deleted = Lyric::delete(&state.db, existing.id).await?;

    Ok(Json(DeleteLyricResponse { deleted }))
}
