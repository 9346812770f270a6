/// Membership model and database operations
///
/// A membership associates a user with a church, scoped by an active time
/// window. Church role assignments (see `member_role`) hang off memberships.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     church_id UUID NOT NULL REFERENCES churches(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     since TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     until TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (church_id, user_id)
/// );
/// ```
///
/// Memberships are soft-deleted: ending one sets `active = FALSE` and stamps
/// `until`, keeping the role history intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership model representing a user-church relationship
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Unique membership ID
    pub id: Uuid,

    /// Church ID
    pub church_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Whether the membership is currently active
    pub active: bool,

    /// Start of the active window
    pub since: DateTime<Utc>,

    /// End of the active window (None while the membership is open)
    pub until: Option<DateTime<Utc>>,

    /// When the membership row was created
    pub created_at: DateTime<Utc>,
}

/// Membership joined with the member's user info, for church member listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipWithUser {
    /// Membership ID
    pub id: Uuid,

    /// Church ID
    pub church_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Whether the membership is currently active
    pub active: bool,

    /// Start of the active window
    pub since: DateTime<Utc>,

    /// End of the active window
    pub until: Option<DateTime<Utc>>,

    /// Member's email
    pub email: String,

    /// Member's display name
    pub name: Option<String>,
}

/// Membership joined with church info, for a user's membership listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipWithChurch {
    /// Membership ID
    pub id: Uuid,

    /// Church ID
    pub church_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Whether the membership is currently active
    pub active: bool,

    /// Start of the active window
    pub since: DateTime<Utc>,

    /// End of the active window
    pub until: Option<DateTime<Utc>>,

    /// Church name
    pub church_name: String,

    /// Church city
    pub church_city: Option<String>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Church ID
    pub church_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Optional explicit start of the active window (defaults to now)
    pub since: Option<DateTime<Utc>>,
}

/// Input for updating a membership's active flag or window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembership {
    /// New active flag
    pub active: Option<bool>,

    /// New end of the active window (use Some(None) to reopen)
    pub until: Option<Option<DateTime<Utc>>>,
}

impl Membership {
    /// Creates a new membership (adds a user to a church)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user is already a member (unique constraint violation)
    /// - Church or user doesn't exist (foreign key violation)
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (church_id, user_id, since)
            VALUES ($1, $2, COALESCE($3, NOW()))
            RETURNING id, church_id, user_id, active, since, until, created_at
            "#,
        )
        .bind(data.church_id)
        .bind(data.user_id)
        .bind(data.since)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Finds a membership by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, church_id, user_id, active, since, until, created_at
            FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Finds the membership of a specific user in a specific church
    pub async fn find_by_church_and_user(
        pool: &PgPool,
        church_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, church_id, user_id, active, since, until, created_at
            FROM memberships
            WHERE church_id = $1 AND user_id = $2
            "#,
        )
        .bind(church_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks whether a user holds an active membership in a church
    pub async fn is_active_member(
        pool: &PgPool,
        church_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM memberships
                WHERE church_id = $1 AND user_id = $2 AND active = TRUE
            )
            "#,
        )
        .bind(church_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates a membership's active flag or window
    ///
    /// # Returns
    ///
    /// The updated membership if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateMembership,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.active.is_none() && data.until.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE memberships SET id = id");
        let mut bind_count = 1;

        if data.active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", active = ${}", bind_count));
        }
        if data.until.is_some() {
            bind_count += 1;
            query.push_str(&format!(", until = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, church_id, user_id, active, since, until, created_at",
        );

        let mut q = sqlx::query_as::<_, Membership>(&query).bind(id);

        if let Some(active) = data.active {
            q = q.bind(active);
        }
        if let Some(until_opt) = data.until {
            q = q.bind(until_opt);
        }

        let membership = q.fetch_optional(pool).await?;

        Ok(membership)
    }

    /// Soft-deletes a membership: deactivates it and closes the window
    ///
    /// # Returns
    ///
    /// True if the membership was found and deactivated, false otherwise
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE memberships SET active = FALSE, until = NOW() WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a church's memberships joined with user info
    ///
    /// Active memberships first, then by join date.
    pub async fn list_by_church(
        pool: &PgPool,
        church_id: Uuid,
    ) -> Result<Vec<MembershipWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, MembershipWithUser>(
            r#"
            SELECT m.id, m.church_id, m.user_id, m.active, m.since, m.until,
                   u.email::text AS email, u.name
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.church_id = $1
            ORDER BY m.active DESC, m.since ASC
            "#,
        )
        .bind(church_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Lists a user's memberships joined with church info
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<MembershipWithChurch>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, MembershipWithChurch>(
            r#"
            SELECT m.id, m.church_id, m.user_id, m.active, m.since, m.until,
                   c.name AS church_name, c.city AS church_city
            FROM memberships m
            JOIN churches c ON c.id = m.church_id
            WHERE m.user_id = $1
            ORDER BY m.since ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_membership_default() {
        let update = UpdateMembership::default();
        assert!(update.active.is_none());
        assert!(update.until.is_none());
    }
}
