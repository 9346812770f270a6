/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts. Users can belong to multiple churches via the Membership model.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     phone VARCHAR(32),
///     phone_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     status user_status NOT NULL DEFAULT 'active',
///     role app_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// Users are never hard-deleted: deactivation flips `status` to `inactive`
/// and inactive users cannot log in.
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
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("John Doe".to_string()),
///     phone: None,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account status
///
/// `inactive` accounts are soft-deleted: the row remains for referential
/// integrity but the user cannot authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Account is active and may authenticate
    Active,

    /// Account is soft-deleted
    Inactive,
}

/// Application-level role
///
/// Distinct from church roles: this governs what the user may do across the
/// whole API (e.g. manage churches), not within one congregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "app_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    /// Full administrative access
    Admin,

    /// Regular user
    Member,
}

impl AppRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "admin",
            AppRole::Member => "member",
        }
    }

    /// Whether this role grants administrative access
    pub fn is_admin(&self) -> bool {
        matches!(self, AppRole::Admin)
    }
}

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT)
    pub email: String,

    /// Whether the email address has been verified
    pub email_verified: bool,

    /// Optional phone number in E.164 format
    pub phone: Option<String>,

    /// Whether the phone number has been verified over WhatsApp
    pub phone_verified: bool,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Account status (active/inactive)
    pub status: UserStatus,

    /// Application-level role
    pub role: AppRole,

    /// When the user account was created
    pub created_at: DateTime<Utc>,

    /// When the user account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional phone number
    pub phone: Option<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address (resets email_verified)
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    /// New display name (use Some(None) to clear)
    pub name: Option<Option<String>>,

    /// New phone number (use Some(None) to clear; resets phone_verified)
    pub phone: Option<Option<String>>,

    /// New account status
    pub status: Option<UserStatus>,

    /// New application role
    pub role: Option<AppRole>,
}

const USER_COLUMNS: &str = "id, email, email_verified, phone, phone_verified, password_hash, \
                            name, status, role, created_at, updated_at, last_login_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// Returns the user if found, None otherwise.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Email lookup is case-insensitive (via CITEXT column type).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are updated. Changing the email clears
    /// `email_verified`; changing the phone clears `phone_verified`. The
    /// `updated_at` timestamp is always set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}, email_verified = FALSE", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}, phone_verified = FALSE", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(name_opt) = data.name {
            q = q.bind(name_opt);
        }
        if let Some(phone_opt) = data.phone {
            q = q.bind(phone_opt);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Soft-deletes a user by setting status to inactive
    ///
    /// The row is kept so memberships, bands, and tokens stay consistent.
    ///
    /// # Returns
    ///
    /// True if the user was found and deactivated, false otherwise
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET status = 'inactive', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the email address as verified
    pub async fn mark_email_verified(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the phone number as verified
    pub async fn mark_phone_verified(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET phone_verified = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp for a user
    ///
    /// This is called after successful authentication.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users with pagination
    ///
    /// Ordered by creation date (newest first).
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Whether this account may authenticate
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_struct() {
        let create_user = CreateUser {
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Test User".to_string()),
            phone: None,
        };

        assert_eq!(create_user.email, "test@example.com");
        assert_eq!(create_user.password_hash, "hash");
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.password_hash.is_none());
        assert!(update.name.is_none());
        assert!(update.phone.is_none());
        assert!(update.status.is_none());
        assert!(update.role.is_none());
    }

    #[test]
    fn test_app_role() {
        assert!(AppRole::Admin.is_admin());
        assert!(!AppRole::Member.is_admin());
        assert_eq!(AppRole::Admin.as_str(), "admin");
        assert_eq!(AppRole::Member.as_str(), "member");
    }

    // Integration tests for database operations are in anthem-api/tests/
}
