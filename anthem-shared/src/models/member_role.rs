/// Church member role assignments
///
/// A member role is a dated role assignment on a membership: which hat a
/// member wears in the congregation, and for how long. Assignments are never
/// deleted; ending one stamps `ended_at`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE church_role AS ENUM
///     ('pastor', 'worship_leader', 'musician', 'vocalist', 'technician');
///
/// CREATE TABLE member_roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     membership_id UUID NOT NULL REFERENCES memberships(id) ON DELETE CASCADE,
///     role church_role NOT NULL,
///     started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     ended_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// At most one open (un-ended) assignment per role per membership. The
/// database carries no constraint for this; callers check `has_open_role`
/// before inserting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles a member can hold within a church
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "church_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChurchRole {
    /// Leads the congregation; manages memberships and roles
    Pastor,

    /// Leads worship; manages bands and repertoire
    WorshipLeader,

    /// Plays an instrument
    Musician,

    /// Sings
    Vocalist,

    /// Sound/projection/stage tech
    Technician,
}

impl ChurchRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurchRole::Pastor => "pastor",
            ChurchRole::WorshipLeader => "worship_leader",
            ChurchRole::Musician => "musician",
            ChurchRole::Vocalist => "vocalist",
            ChurchRole::Technician => "technician",
        }
    }

    /// Whether this role may manage the church's memberships and roles
    pub fn can_manage_members(&self) -> bool {
        matches!(self, ChurchRole::Pastor)
    }
}

/// A dated role assignment on a membership
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberRole {
    /// Unique assignment ID
    pub id: Uuid,

    /// Membership this assignment belongs to
    pub membership_id: Uuid,

    /// Assigned role
    pub role: ChurchRole,

    /// When the assignment started
    pub started_at: DateTime<Utc>,

    /// When the assignment ended (None while open)
    pub ended_at: Option<DateTime<Utc>>,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for assigning a role to a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRole {
    /// Membership to assign the role on
    pub membership_id: Uuid,

    /// Role to assign
    pub role: ChurchRole,

    /// Optional explicit start (defaults to now)
    pub started_at: Option<DateTime<Utc>>,
}

impl MemberRole {
    /// Assigns a role to a membership
    ///
    /// Callers must first check `has_open_role` — the open-assignment
    /// uniqueness rule lives in the application, not the schema.
    pub async fn create(pool: &PgPool, data: CreateMemberRole) -> Result<Self, sqlx::Error> {
        let member_role = sqlx::query_as::<_, MemberRole>(
            r#"
            INSERT INTO member_roles (membership_id, role, started_at)
            VALUES ($1, $2, COALESCE($3, NOW()))
            RETURNING id, membership_id, role, started_at, ended_at, created_at
            "#,
        )
        .bind(data.membership_id)
        .bind(data.role)
        .bind(data.started_at)
        .fetch_one(pool)
        .await?;

        Ok(member_role)
    }

    /// Finds an assignment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let member_role = sqlx::query_as::<_, MemberRole>(
            r#"
            SELECT id, membership_id, role, started_at, ended_at, created_at
            FROM member_roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(member_role)
    }

    /// Checks whether the membership already has an open assignment of `role`
    pub async fn has_open_role(
        pool: &PgPool,
        membership_id: Uuid,
        role: ChurchRole,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM member_roles
                WHERE membership_id = $1 AND role = $2 AND ended_at IS NULL
            )
            "#,
        )
        .bind(membership_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Ends an assignment by stamping `ended_at`
    ///
    /// # Returns
    ///
    /// True if an open assignment was ended, false otherwise
    pub async fn end(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE member_roles SET ended_at = NOW() WHERE id = $1 AND ended_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all assignments for a membership, open ones first
    pub async fn list_by_membership(
        pool: &PgPool,
        membership_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let roles = sqlx::query_as::<_, MemberRole>(
            r#"
            SELECT id, membership_id, role, started_at, ended_at, created_at
            FROM member_roles
            WHERE membership_id = $1
            ORDER BY (ended_at IS NULL) DESC, started_at ASC
            "#,
        )
        .bind(membership_id)
        .fetch_all(pool)
        .await?;

        Ok(roles)
    }

    /// Checks whether a user holds an open `role` assignment in a church
    ///
    /// Joins through the membership so authorization helpers can ask the
    /// question directly from (church, user).
    pub async fn user_has_open_role(
        pool: &PgPool,
        church_id: Uuid,
        user_id: Uuid,
        role: ChurchRole,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM member_roles r
                JOIN memberships m ON m.id = r.membership_id
                WHERE m.church_id = $1
                  AND m.user_id = $2
                  AND m.active = TRUE
                  AND r.role = $3
                  AND r.ended_at IS NULL
            )
            "#,
        )
        .bind(church_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_church_role_strings() {
        assert_eq!(ChurchRole::Pastor.as_str(), "pastor");
        assert_eq!(ChurchRole::WorshipLeader.as_str(), "worship_leader");
        assert_eq!(ChurchRole::Musician.as_str(), "musician");
        assert_eq!(ChurchRole::Vocalist.as_str(), "vocalist");
        assert_eq!(ChurchRole::Technician.as_str(), "technician");
    }

    #[test]
    fn test_member_management() {
        assert!(ChurchRole::Pastor.can_manage_members());
        assert!(!ChurchRole::Musician.can_manage_members());
        assert!(!ChurchRole::WorshipLeader.can_manage_members());
    }
}
