/// Song endpoints
///
/// Songs live in a band's repertoire; all operations require band access
/// (member, creator, or admin). Fetching one song includes its ordered
/// lyrics and chords.
///
/// # Endpoints
///
/// - `POST /v1/bands/:band_id/songs` - Add a song to the repertoire
/// - `GET /v1/bands/:band_id/songs` - List the repertoire (paginated)
/// - `GET /v1/songs/:song_id` - Fetch one song with lyrics and chords
/// - `PATCH /v1/songs/:song_id` - Update a song
/// - `DELETE /v1/songs/:song_id` - Delete a song

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PaginationParams,
};
use anthem_shared::{
    auth::{authorization::require_band_access, middleware::AuthContext},
    models::{
        chord::Chord,
        lyric::Lyric,
        song::{CreateSong, Song, UpdateSong},
    },
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create song request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSongRequest {
    /// Song title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional author/composer
    #[validate(length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: Option<String>,

    /// Optional musical key (e.g. "G", "F#m")
    #[validate(length(max = 12, message = "Key must be at most 12 characters"))]
    pub musical_key: Option<String>,

    /// Optional tempo in BPM
    #[validate(range(min = 20, max = 300, message = "Tempo must be 20-300 BPM"))]
    pub tempo: Option<i32>,
}

/// Update song request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSongRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New author
    #[validate(length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: Option<String>,

    /// New musical key
    #[validate(length(max = 12, message = "Key must be at most 12 characters"))]
    pub musical_key: Option<String>,

    /// New tempo in BPM
    #[validate(range(min = 20, max = 300, message = "Tempo must be 20-300 BPM"))]
    pub tempo: Option<i32>,
}

/// Song with its ordered lyrics and chords
#[derive(Debug, Serialize)]
pub struct SongDetailResponse {
    /// The song
    #[serde(flatten)]
    pub song: Song,

    /// Lyric sections ordered by position
    pub lyrics: Vec<Lyric>,

    /// Chord lines ordered by position
    pub chords: Vec<Chord>,
}

/// List songs response
#[derive(Debug, Serialize)]
pub struct ListSongsResponse {
    /// Songs on this page
    pub songs: Vec<Song>,

    /// Total songs in the repertoire
    pub total: i64,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteSongResponse {
    /// Whether the song was deleted
    pub deleted: bool,
}

/// Loads a song and checks the caller has access to its band
pub(crate) async fn song_with_access(
    state: &AppState,
    auth: &AuthContext,
    song_id: Uuid,
) -> ApiResult<Song> {
    let song = Song::find_by_id(&state.db, song_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))?;

    require_band_access(&state.db, auth, song.band_id).await?;

    Ok(song)
}

/// Add a song to a band's repertoire (band access)
pub async fn create_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Json(req): Json<CreateSongRequest>,
) -> ApiResult<Json<Song>> {
    require_band_access(&state.db, &auth, band_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let song = Song::create(
        &state.db,
        CreateSong {
            band_id,
            title: req.title,
            author: req.author,
            musical_key: req.musical_key,
            tempo: req.tempo,
        },
    )
    .await?;

    Ok(Json(song))
}

/// List a band's repertoire with pagination (band access)
pub async fn list_songs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<ListSongsResponse>> {
    require_band_access(&state.db, &auth, band_id).await?;

    let songs = Song::list_by_band(&state.db, band_id, page.limit, page.offset).await?;
    let total = Song::count_by_band(&state.db, band_id).await?;

    Ok(Json(ListSongsResponse { songs, total }))
}

/// Fetch one song with its ordered lyrics and chords (band access)
///
/// # Errors
///
/// - `404 Not Found`: No such song
pub async fn get_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Json<SongDetailResponse>> {
    let song = song_with_access(&state, &auth, song_id).await?;

    let lyrics = Lyric::list_by_song(&state.db, song.id).await?;
    let chords = Chord::list_by_song(&state.db, song.id).await?;

    Ok(Json(SongDetailResponse {
        song,
        lyrics,
        chords,
    }))
}

/// Update a song (band access)
pub async fn update_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
    Json(req): Json<UpdateSongRequest>,
) -> ApiResult<Json<Song>> {
    song_with_access(&state, &auth, song_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let song = Song::update(
        &state.db,
        song_id,
        UpdateSong {
            title: req.title,
            author: req.author.map(Some),
            musical_key: req.musical_key.map(Some),
            tempo: req.tempo.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))?;

    Ok(Json(song))
}

/// Delete a song (band access)
///
/// Cascades to its lyrics and chords.
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Json<DeleteSongResponse>> {
    song_with_access(&state, &auth, song_id).await?;

    let deleted = Song::delete(&state.db, song_id).await?;

    Ok(Json(DeleteSongResponse { deleted }))
}
