/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use anthem_shared::{
    auth::{jwt, middleware::AuthContext},
    notify::Notifier,
};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound notification transport
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/                          # API v1 (versioned)
///     ├── /auth/                    # Registration, login, token flows
///     ├── /users/                   # User accounts (JWT)
///     ├── /churches/                # Churches, members, roles, bands (JWT)
///     ├── /bands/                   # Bands, members, songs, events (JWT)
///     ├── /songs/                   # Songs, lyrics, chords (JWT)
///     └── /events/                  # Events (JWT)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes that run unauthenticated
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/verify-email", post(routes::auth::verify_email))
        .route(
            "/password-reset/request",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        );

    // Auth routes that act on the logged-in account
    let auth_protected = Router::new()
        .route(
            "/verify-email/request",
            post(routes::auth::request_email_verification),
        )
        .route("/phone/request", post(routes::auth::request_phone_link))
        .route("/phone/verify", post(routes::auth::verify_phone))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:user_id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/:user_id/memberships",
            get(routes::users::list_user_memberships),
        )
        .route(
            "/:user_id/subscriptions",
            get(routes::users::list_user_subscriptions),
        );

    let church_routes = Router::new()
        .route(
            "/",
            post(routes::churches::create_church).get(routes::churches::list_churches),
        )
        .route(
            "/:church_id",
            get(routes::churches::get_church)
                .patch(routes::churches::update_church)
                .delete(routes::churches::delete_church),
        )
        .route(
            "/:church_id/bands",
            post(routes::bands::create_band).get(routes::bands::list_church_bands),
        )
        .route(
            "/:church_id/members",
            post(routes::memberships::add_member).get(routes::memberships::list_members),
        )
        .route(
            "/:church_id/members/:membership_id",
            axum::routing::patch(routes::memberships::update_member)
                .delete(routes::memberships::remove_member),
        )
        .route(
            "/:church_id/members/:membership_id/roles",
            post(routes::member_roles::assign_role).get(routes::member_roles::list_roles),
        )
        .route(
            "/:church_id/members/:membership_id/roles/:role_id",
            delete(routes::member_roles::end_role),
        );

    let band_routes = Router::new()
        .route(
            "/:band_id",
            get(routes::bands::get_band)
                .patch(routes::bands::update_band)
                .delete(routes::bands::delete_band),
        )
        .route(
            "/:band_id/members",
            post(routes::bands::add_band_member).get(routes::bands::list_band_members),
        )
        .route(
            "/:band_id/members/:user_id",
            delete(routes::bands::remove_band_member),
        )
        .route(
            "/:band_id/songs",
            post(routes::songs::create_song).get(routes::songs::list_songs),
        )
        .route(
            "/:band_id/events",
            post(routes::events::create_event).get(routes::events::list_events),
        )
        .route(
            "/:band_id/subscriptions",
            post(routes::subscriptions::subscribe).delete(routes::subscriptions::unsubscribe),
        );

    let song_routes = Router::new()
        .route(
            "/:song_id",
            get(routes::songs::get_song)
                .patch(routes::songs::update_song)
                .delete(routes::songs::delete_song),
        )
        .route(
            "/:song_id/lyrics",
            post(routes::lyrics::create_lyric).get(routes::lyrics::list_lyrics),
        )
        .route(
            "/:song_id/lyrics/:lyric_id",
            axum::routing::patch(routes::lyrics::update_lyric)
                .delete(routes::lyrics::delete_lyric),
        )
        .route(
            "/:song_id/chords",
            post(routes::chords::create_chord).get(routes::chords::list_chords),
        )
        .route(
            "/:song_id/chords/:chord_id",
            axum::routing::patch(routes::chords::update_chord)
                .delete(routes::chords::delete_chord),
        );

    let event_routes = Router::new().route(
        "/:event_id",
        get(routes::events::get_event)
            .patch(routes::events::update_event)
            .delete(routes::events::delete_event),
    );

    // Everything resource-shaped requires a valid access token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/churches", church_routes)
        .nest("/bands", band_routes)
        .nest("/songs", song_routes)
        .nest("/events", event_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the JWT access token from the Authorization
/// header, then injects an AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    use anthem_shared::auth::middleware::extract_bearer_token;

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = extract_bearer_token(auth_header)?;

    // Refresh tokens are rejected here; only access tokens authenticate
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_jwt(claims.sub, claims.role);

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
