/// Subscription endpoints
///
/// A subscription ties the authenticated user to a band's event
/// announcements. Unsubscribing deactivates the row; subscribing again
/// reactivates it.
///
/// # Endpoints
///
/// - `POST /v1/bands/:band_id/subscriptions` - Subscribe the caller
/// - `DELETE /v1/bands/:band_id/subscriptions` - Unsubscribe the caller

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use anthem_shared::{
    auth::middleware::AuthContext,
    models::{band::Band, subscription::Subscription},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

/// Unsubscribe acknowledgement
#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    /// Whether an active subscription was deactivated
    pub unsubscribed: bool,
}

/// Subscribe the authenticated user to a band
///
/// Re-subscribing after an unsubscribe reactivates the original row.
///
/// # Errors
///
/// - `404 Not Found`: No such band
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
) -> ApiResult<Json<Subscription>> {
    // Any authenticated user may follow a band that exists
    Band::find_by_id(&state.db, band_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Band not found".to_string()))?;

    let subscription = Subscription::subscribe(&state.db, auth.user_id, band_id).await?;

    Ok(Json(subscription))
}

/// Unsubscribe the authenticated user from a band
///
/// # Errors
///
/// - `404 Not Found`: No active subscription to this band
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(band_id): Path<Uuid>,
) -> ApiResult<Json<UnsubscribeResponse>> {
    let unsubscribed = Subscription::unsubscribe(&state.db, auth.user_id, band_id).await?;

    if !unsubscribed {
        return Err(ApiError::NotFound(
            "No active subscription to this band".to_string(),
        ));
    }

    Ok(Json(UnsubscribeResponse { unsubscribed }))
}
