/// Lyric sections of a song
///
/// Lyrics are an ordered sublist of a song: each row is one section (verse,
/// chorus, bridge) at a `position`. Position uniqueness per song is enforced
/// at the application layer — callers check `position_taken` before inserts
/// and moves, and answer collisions with a conflict. The schema deliberately
/// carries no unique index on (song_id, position).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One lyric section of a song
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lyric {
    /// Unique lyric ID
    pub id: Uuid,

    /// Song this section belongs to
    pub song_id: Uuid,

    /// Position within the song (app-enforced unique per song)
    pub position: i32,

    /// Optional section heading (e.g. "Chorus", "Verse 2")
    pub heading: Option<String>,

    /// Section text
    pub body: String,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a lyric section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLyric {
    /// Song ID
    pub song_id: Uuid,

    /// Position within the song
    pub position: i32,

    /// Optional section heading
    pub heading: Option<String>,

    /// Section text
    pub body: String,
}

/// Input for updating a lyric section
///
/// Only non-None fields will be updated. Moving to an occupied position is a
/// caller-side conflict check, as on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLyric {
    /// New position
    pub position: Option<i32>,

    /// New heading (use Some(None) to clear)
    pub heading: Option<Option<String>>,

    /// New section text
    pub body: Option<String>,
}

impl Lyric {
    /// Creates a lyric section
    ///
    /// Callers must first check `position_taken`.
    pub async fn create(pool: &PgPool, data: CreateLyric) -> Result<Self, sqlx::Error> {
        let lyric = sqlx::query_as::<_, Lyric>(
            r#"
            INSERT INTO lyrics (song_id, position, heading, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, song_id, position, heading, body, created_at
            "#,
        )
        .bind(data.song_id)
        .bind(data.position)
        .bind(data.heading)
        .bind(data.body)
        .fetch_one(pool)
        .await?;

        Ok(lyric)
    }

    /// Finds a lyric section by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let lyric = sqlx::query_as::<_, Lyric>(
            "SELECT id, song_id, position, heading, body, created_at FROM lyrics WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(lyric)
    }

    /// Checks whether a position is already occupied in a song
    ///
    /// `exclude_id` skips one row — used when moving an existing section so
    /// it doesn't collide with itself.
    pub async fn position_taken(
        pool: &PgPool,
        song_id: Uuid,
        position: i32,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM lyrics
                WHERE song_id = $1 AND position = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(song_id)
        .bind(position)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Updates a lyric section
    ///
    /// # Returns
    ///
    /// The updated section if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateLyric,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.position.is_none() && data.heading.is_none() && data.body.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE lyrics SET id = id");
        let mut bind_count = 1;

        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }
        if data.heading.is_some() {
            bind_count += 1;
            query.push_str(&format!(", heading = ${}", bind_count));
        }
        if data.body.is_some() {
            bind_count += 1;
            query.push_str(&format!(", body = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, song_id, position, heading, body, created_at");

        let mut q = sqlx::query_as::<_, Lyric>(&query).bind(id);

        if let Some(position) = data.position {
            q = q.bind(position);
        }
        if let Some(heading_opt) = data.heading {
            q = q.bind(heading_opt);
        }
        if let Some(body) = data.body {
            q = q.bind(body);
        }

        let lyric = q.fetch_optional(pool).await?;

        Ok(lyric)
    }

    /// Deletes a lyric section by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lyrics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a song's lyric sections ordered by position
    pub async fn list_by_song(pool: &PgPool, song_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lyrics = sqlx::query_as::<_, Lyric>(
            r#"
            SELECT id, song_id, position, heading, body, created_at
            FROM lyrics
            WHERE song_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(song_id)
        .fetch_all(pool)
        .await?;

        Ok(lyrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_lyric_default() {
        let update = UpdateLyric::default();
        assert!(update.position.is_none());
        assert!(update.heading.is_none());
        assert!(update.body.is_none());
    }
}
