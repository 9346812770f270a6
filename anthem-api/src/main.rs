//! # Anthem API Server
//!
//! The HTTP API for Anthem: worship band and church management — users,
//! memberships, church roles, bands, songs, events, subscriptions, and
//! authentication.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p anthem-api
//! ```

use anthem_api::{
    app::{build_router, AppState},
    config::Config,
};
use anthem_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::temporal_token::TemporalToken,
    notify::LogNotifier,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anthem_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Anthem API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool and run migrations
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    // Token pool housekeeping: drop long-dead verification/reset tokens
    let pruned = TemporalToken::prune(&pool, chrono::Duration::days(7)).await?;
    if pruned > 0 {
        tracing::info!("Pruned {} stale temporal tokens", pruned);
    }

    // Build Axum application
    let state = AppState::new(pool.clone(), config.clone(), Arc::new(LogNotifier));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");
    close_pool(pool).await;

    Ok(())
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
}
