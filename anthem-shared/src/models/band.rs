/// Band model and database operations
///
/// A band belongs to a church and has a creator plus a member list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE bands (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     church_id UUID NOT NULL REFERENCES churches(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (church_id, name)
/// );
///
/// CREATE TABLE band_members (
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     instrument VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (band_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Band model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Band {
    /// Unique band ID
    pub id: Uuid,

    /// Church the band belongs to
    pub church_id: Uuid,

    /// Band name (unique within the church)
    pub name: String,

    /// User who created the band
    pub created_by: Uuid,

    /// When the band was created
    pub created_at: DateTime<Utc>,

    /// When the band was last updated
    pub updated_at: DateTime<Utc>,
}

/// Band membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BandMember {
    /// Band ID
    pub band_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Optional instrument the member plays
    pub instrument: Option<String>,

    /// When the member joined
    pub created_at: DateTime<Utc>,
}

/// Band member joined with user info, for member listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BandMemberWithUser {
    /// Band ID
    pub band_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Optional instrument
    pub instrument: Option<String>,

    /// When the member joined
    pub created_at: DateTime<Utc>,

    /// Member's email
    pub email: String,

    /// Member's display name
    pub name: Option<String>,
}

/// Input for creating a new band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBand {
    /// Church the band belongs to
    pub church_id: Uuid,

    /// Band name
    pub name: String,

    /// Creator user ID
    pub created_by: Uuid,
}

/// Input for adding a member to a band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBandMember {
    /// Band ID
    pub band_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Optional instrument
    pub instrument: Option<String>,
}

impl Band {
    /// Creates a new band
    ///
    /// The creator is automatically added as the first member.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is already taken within the church (unique constraint)
    /// - Church or creator doesn't exist (foreign key violation)
    pub async fn create(pool: &PgPool, data: CreateBand) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let band = sqlx::query_as::<_, Band>(
            r#"
            INSERT INTO bands (church_id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, church_id, name, created_by, created_at, updated_at
            "#,
        )
        .bind(data.church_id)
        .bind(data.name)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO band_members (band_id, user_id) VALUES ($1, $2)")
            .bind(band.id)
            .bind(data.created_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(band)
    }

    /// Finds a band by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let band = sqlx::query_as::<_, Band>(
            r#"
            SELECT id, church_id, name, created_by, created_at, updated_at
            FROM bands
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(band)
    }

    /// Renames a band
    ///
    /// # Returns
    ///
    /// The updated band if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the new name collides within the church
    pub async fn rename(
        pool: &PgPool,
        id: Uuid,
        name: String,
    ) -> Result<Option<Self>, sqlx::Error> {
        let band = sqlx::query_as::<_, Band>(
            r#"
            UPDATE bands SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, church_id, name, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(band)
    }

    /// Deletes a band by ID
    ///
    /// Cascades to members, songs, and events.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a church's bands, ordered by name
    pub async fn list_by_church(pool: &PgPool, church_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let bands = sqlx::query_as::<_, Band>(
            r#"
            SELECT id, church_id, name, created_by, created_at, updated_at
            FROM bands
            WHERE church_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(church_id)
        .fetch_all(pool)
        .await?;

        Ok(bands)
    }
}

impl BandMember {
    /// Adds a member to a band
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user is already a member (primary key violation)
    /// - Band or user doesn't exist (foreign key violation)
    pub async fn create(pool: &PgPool, data: CreateBandMember) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, BandMember>(
            r#"
            INSERT INTO band_members (band_id, user_id, instrument)
            VALUES ($1, $2, $3)
            RETURNING band_id, user_id, instrument, created_at
            "#,
        )
        .bind(data.band_id)
        .bind(data.user_id)
        .bind(data.instrument)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a user is a member of a band
    pub async fn is_member(
        pool: &PgPool,
        band_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM band_members WHERE band_id = $1 AND user_id = $2)",
        )
        .bind(band_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Removes a member from a band
    pub async fn remove(pool: &PgPool, band_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM band_members WHERE band_id = $1 AND user_id = $2")
            .bind(band_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a band's members joined with user info, oldest first
    pub async fn list_by_band(
        pool: &PgPool,
        band_id: Uuid,
    ) -> Result<Vec<BandMemberWithUser>, sqlx::Error> {
        let members = sqlx::query_as::<_, BandMemberWithUser>(
            r#"
            SELECT bm.band_id, bm.user_id, bm.instrument, bm.created_at,
                   u.email::text AS email, u.name
            FROM band_members bm
            JOIN users u ON u.id = bm.user_id
            WHERE bm.band_id = $1
            ORDER BY bm.created_at ASC
            "#,
        )
        .bind(band_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_band_struct() {
        let data = CreateBand {
            church_id: Uuid::new_v4(),
            name: "Sunday Worship".to_string(),
            created_by: Uuid::new_v4(),
        };

        assert_eq!(data.name, "Sunday Worship");
    }
}
