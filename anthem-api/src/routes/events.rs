/// Event endpoints
///
/// Events are scheduled per band. Creating one announces it to the band's
/// active subscribers (best-effort, never blocking the request).
///
/// # Endpoints
///
/// - `POST /v1/bands/:band_id/events` - Schedule an event (band access)
/// - `GET /v1/bands/:band_id/events` - List events, soonest first (band access)
/// - `GET /v1/events/:event_id` - Fetch one event (band access)
/// - `PATCH /v1/events/:event_id` - Update an event (band access)
/// - `DELETE /v1/events/:event_id` - Delete an event (band access)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PaginationParams,
};
use anthem_shared::{
    auth::{authorization::require_band_access, middleware::AuthContext},
    models::{
        event::{CreateEvent, Event, UpdateEvent},
        subscription::Subscription,
        user::User,
    },
    notify::{Notification, NotificationChannel, Notifier as _},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

/// How long subscriber announcements may take before the request stops waiting
const ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create event request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Event title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional location
    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    /// When the event starts
    pub starts_at: DateTime<Utc>,

    /// Optional end time
    pub ends_at: Option<DateTime<Utc>>,

    /// Optional notes
    pub notes: Option<String>,
}

/// Update event request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New location
    #[validate(length(max = 255, message = "Location must be at most 255 characters"))]
    pub location: Option<String>,

    /// New start time
    pub starts_at: Option<DateTime<Utc>>,

    /// New end time
    pub ends_at: Option<DateTime<Utc>>,

    /// New notes
    pub notes: Option<String>,
}

/// Deletion acknowledgement
#[derive(Debug, Serialize)]
pub struct DeleteEventResponse {
    /// Whether the event was deleted
    pub deleted: bool,
}

/// Loads an event and checks the caller has access to its band
async fn event_with_access(
    state: &AppState,
    auth: &AuthContext,
    event_id: Uuid,
) -> ApiResult<Event> {
    let event = Event::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    require_band_access(&state.db, auth, event.band_id).await?;

    Ok(event)
}

/// Announces a new event to the band's active subscribers
///
/// Best-effort: bounded by a fixed delay, failures are logged and dropped.
async fn announce_event(state: &AppState, event: &Event) {
    let subscriber_ids = match Subscription::subscriber_ids(&state.db, event.band_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Failed to load subscribers for announcement: {}", e);
            return;
        }
    };

    let announce = async {
        for user_id in subscriber_ids {
            let user = match User::find_by_id(&state.db, user_id).await {
                Ok(Some(user)) => user,
                _ => continue,
            };

            let result = state
                .notifier
                .send(Notification {
                    channel: NotificationChannel::Email {
                        to: user.email.clone(),
                    },
                    subject: format!("New event: {}", event.title),
                    body: format!("The band scheduled \"{}\" for {}", event.title, event.starts_at),
                })
                .await;

            if let Err(e) = result {
                tracing::warn!("Event announcement to {} failed: {}", user.email, e);
            }
        }
    };

    if tokio::time::timeout(ANNOUNCE_TIMEOUT, announce).await.is_err() {
        tracing::warn!(
            "Event announcements timed out after {:?}",
            ANNOUNCE_TIMEOUT
        );
    }
}

/// Schedule an event (band access)
///
/// Active subscribers are notified best-effort.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<Json<Event>> {
    require_band_access(&state.db, &auth, band_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let event = Event::create(
        &state.db,
        CreateEvent {
            band_id,
            title: req.title,
            location: req.location,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            notes: req.notes,
        },
    )
    .await?;

    announce_event(&state, &event).await;

    Ok(Json(event))
}

/// List a band's events, soonest first (band access)
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Event>>> {
    require_band_access(&state.db, &auth, band_id).await?;

    let events = Event::list_by_band(&state.db, band_id, page.limit, page.offset).await?;

    Ok(Json(events))
}

/// Fetch one event (band access)
pub async fn get_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    let event = event_with_access(&state, &auth, event_id).await?;

    Ok(Json(event))
}

/// Update an event (band access)
pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> ApiResult<Json<Event>> {
    event_with_access(&state, &auth, event_id).await?;

    req.validate().map_err(ApiError::from_validation)?;

    let event = Event::update(
        &state.db,
        event_id,
        UpdateEvent {
            title: req.title,
            location: req.location.map(Some),
            starts_at: req.starts_at,
            ends_at: req.ends_at.map(Some),
            notes: req.notes.map(Some),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

/// Delete an event (band access)
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<DeleteEventResponse>> {
    event_with_access(&state, &auth, event_id).await?;

    let deleted = Event::delete(&state.db, event_id).await?;

    Ok(Json(DeleteEventResponse { deleted }))
}
