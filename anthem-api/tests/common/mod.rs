/// Common test utilities for integration tests
///
/// Shared infrastructure for integration tests:
/// - Test database setup (migrated schema, fresh church + users per test)
/// - JWT token generation
/// - Request helpers for driving the router

use anthem_api::app::{build_router, AppState};
use anthem_api::config::Config;
use anthem_shared::auth::jwt::{create_token, Claims, TokenType};
use anthem_shared::auth::password::hash_password;
use anthem_shared::models::church::{Church, CreateChurch};
use anthem_shared::models::membership::{CreateMembership, Membership};
use anthem_shared::models::user::{AppRole, CreateUser, UpdateUser, User};
use anthem_shared::notify::LogNotifier;
use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub church: Church,
    pub admin: User,
    pub admin_token: String,
    pub member: User,
    pub member_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and a fresh
    /// church, admin user, and regular member
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Create test church
        let church = Church::create(
            &db,
            CreateChurch {
                name: format!("Test Church {}", Uuid::new_v4()),
                address: None,
                city: Some("Testville".to_string()),
            },
        )
        .await?;

        // Create admin user
        let admin = create_test_user(&db, AppRole::Admin).await?;

        // Create regular member with an active church membership
        let member = create_test_user(&db, AppRole::Member).await?;
        Membership::create(
            &db,
            CreateMembership {
                church_id: church.id,
                user_id: member.id,
                since: None,
            },
        )
        .await?;

        // Generate JWT tokens
        let admin_token = token_for(&admin, &config.jwt.secret)?;
        let member_token = token_for(&member, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone(), Arc::new(LogNotifier));
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            church,
            admin,
            admin_token,
            member,
            member_token,
        })
    }

    /// Returns the admin's authorization header value
    pub fn admin_auth(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    /// Returns the member's authorization header value
    pub fn member_auth(&self) -> String {
        format!("Bearer {}", self.member_token)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Delete the test church (cascades to memberships, bands, songs)
        Church::delete(&self.db, self.church.id).await?;

        // Test users are soft-deleted only; remove them for real
        sqlx::query("DELETE FROM users WHERE id = $1 OR id = $2")
            .bind(self.admin.id)
            .bind(self.member.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Creates a test user with a unique email and the given app role
pub async fn create_test_user(db: &PgPool, role: AppRole) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: hash_password("Test-P@ssw0rd")?,
            name: Some("Test User".to_string()),
            phone: None,
        },
    )
    .await?;

    // Role is assigned post-create; registration never takes a role
    let user = User::update(
        db,
        user.id,
        UpdateUser {
            role: Some(role),
            ..Default::default()
        },
    )
    .await?
    .expect("test user should exist");

    Ok(user)
}

/// Creates an access token for a user
pub fn token_for(user: &User, secret: &str) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, user.role, TokenType::Access);
    Ok(create_token(&claims, secret)?)
}

/// Builds a JSON request with an authorization header
pub fn json_request(
    method: &str,
    uri: &str,
    auth: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a bodyless request with an authorization header
pub fn bare_request(method: &str, uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth)
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
