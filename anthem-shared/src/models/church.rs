/// Church model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE churches (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     address VARCHAR(512),
///     city VARCHAR(128),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Users belong to churches via the `memberships` table; deleting a church
/// cascades to its memberships and bands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Church model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Church {
    /// Unique church ID
    pub id: Uuid,

    /// Church name
    pub name: String,

    /// Optional street address
    pub address: Option<String>,

    /// Optional city
    pub city: Option<String>,

    /// When the church was created
    pub created_at: DateTime<Utc>,

    /// When the church was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new church
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChurch {
    /// Church name
    pub name: String,

    /// Optional street address
    pub address: Option<String>,

    /// Optional city
    pub city: Option<String>,
}

/// Input for updating an existing church
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChurch {
    /// New name
    pub name: Option<String>,

    /// New address (use Some(None) to clear)
    pub address: Option<Option<String>>,

    /// New city (use Some(None) to clear)
    pub city: Option<Option<String>>,
}

impl Church {
    /// Creates a new church
    pub async fn create(pool: &PgPool, data: CreateChurch) -> Result<Self, sqlx::Error> {
        let church = sqlx::query_as::<_, Church>(
            r#"
            INSERT INTO churches (name, address, city)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, city, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.address)
        .bind(data.city)
        .fetch_one(pool)
        .await?;

        Ok(church)
    }

    /// Finds a church by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let church = sqlx::query_as::<_, Church>(
            "SELECT id, name, address, city, created_at, updated_at FROM churches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(church)
    }

    /// Updates an existing church
    ///
    /// # Returns
    ///
    /// The updated church if found, None if the church doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateChurch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE churches SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.city.is_some() {
            bind_count += 1;
            query.push_str(&format!(", city = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, name, address, city, created_at, updated_at");

        let mut q = sqlx::query_as::<_, Church>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(address_opt) = data.address {
            q = q.bind(address_opt);
        }
        if let Some(city_opt) = data.city {
            q = q.bind(city_opt);
        }

        let church = q.fetch_optional(pool).await?;

        Ok(church)
    }

    /// Deletes a church by ID
    ///
    /// Cascades to memberships and bands.
    ///
    /// # Returns
    ///
    /// True if the church was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM churches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists churches with pagination, ordered by name
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let churches = sqlx::query_as::<_, Church>(
            r#"
            SELECT id, name, address, city, created_at, updated_at
            FROM churches
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(churches)
    }

    /// Counts total number of churches
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM churches")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_church_default() {
        let update = UpdateChurch::default();
        assert!(update.name.is_none());
        assert!(update.address.is_none());
        assert!(update.city.is_none());
    }
}
