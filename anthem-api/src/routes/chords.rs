/// Chord endpoints
///
/// Chord lines mirror lyrics: an ordered sublist of a song with
/// application-enforced position uniqueness.
///
/// # Endpoints
///
/// - `POST /v1/songs/:song_id/chords` - Insert a chord line at a position
/// - `GET /v1/songs/:song_id/chords` - List chord lines ordered by position
/// - `PATCH /v1/songs/:song_id/chords/:chord_id` - Edit or move a chord line
/// - `DELETE /v1/songs/:song_id/chords/:chord_id` - Delete a chord line

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::songs::song_with_access,
};
use anthem_shared::{
    auth::middleware::AuthContext,
    models::chord::{Chord, CreateChord, UpdateChord},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create chord request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChordRequest {
    /// Position within the song
    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: i32,

    /// Chord notation (e.g. "G  D/F#  Em7  C")
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Update chord request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChordRequest {
    /// New position
    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: Option<i32>,

    /// New chord notation
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteChordResponse {
    /// Whether the chord line was deleted
    pub deleted: bool,
}

/// Insert a chord line (band access)
///
/// # Errors
///
/// - `409 Conflict`: Position already occupied in this song
pub async fn create_chord(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
    Json(req): Json<CreateChordRequest>,
) -> ApiResult<Json<Chord>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    if Chord::position_taken(&state.db, song.id, req.position, None).await? {
        return Err(ApiError::Conflict(format!(
            "Position {} is already occupied",
            req.position
        )));
    }

    let chord = Chord::create(
        &state.db,
        CreateChord {
            song_id: song.id,
            position: req.position,
            content: req.content,
        },
    )
    .await?;

    Ok(Json(chord))
}

/// List a song's chord lines ordered by position (band access)
pub async fn list_chords(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Chord>>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    let chords = Chord::list_by_song(&state.db, song.id).await?;

    Ok(Json(chords))
}

/// Edit or move a chord line (band access)
///
/// # Errors
///
/// - `404 Not Found`: Chord line doesn't exist on this song
/// - `409 Conflict`: Target position already occupied
pub async fn update_chord(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((song_id, chord_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateChordRequest>,
) -> ApiResult<Json<Chord>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let existing = Chord::find_by_id(&state.db, chord_id)
        .await?
        .filter(|c| c.song_id == song.id)
        .ok_or_else(|| ApiError::NotFound("Chord not found".to_string()))?;

    if let Some(position) = req.position {
        if Chord::position_taken(&state.db, song.id, position, Some(existing.id)).await? {
            return Err(ApiError::Conflict(format!(
                "Position {} is already occupied",
                position
            )));
        }
    }

    let chord = Chord::update(
        &state.db,
        existing.id,
        UpdateChord {
            position: req.position,
            content: req.content,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Chord not found".to_string()))?;

    Ok(Json(chord))
}

/// Delete a chord line (band access)
pub async fn delete_chord(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((song_id, chord_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteChordResponse>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    let existing = Chord::find_by_id(&state.db, chord_id)
        .await?
        .filter(|c| c.song_id == song.id)
        .ok_or_else(|| ApiError::NotFound("Chord not found".to_string()))?;

    let deleted = Chord::delete(&state.db, existing.id).await?;

    Ok(Json(DeleteChordResponse { deleted }))
}
