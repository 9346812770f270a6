/// Database models for Anthem
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `church`: Churches (congregations)
/// - `membership`: User-church relationships with an active window
/// - `member_role`: Dated church role assignments on memberships
/// - `band`: Worship bands and their members
/// - `song`: Songs in a band's repertoire
/// - `lyric`: Ordered lyric sections of a song
/// - `chord`: Ordered chord lines of a song
/// - `event`: Scheduled band events
/// - `subscription`: User subscriptions to band events
/// - `temporal_token`: Single-use, purpose-tagged, expiring credentials
///
/// # Example
///
/// ```no_run
/// use anthem_shared::models::user::{User, CreateUser};
/// use anthem_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("John Doe".to_string()),
///     phone: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod band;
pub mod chord;
pub mod church;
pub mod event;
pub mod lyric;
pub mod member_role;
pub mod membership;
pub mod song;
pub mod subscription;
pub mod temporal_token;
pub mod user;
