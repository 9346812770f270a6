/// Chord lines of a song
///
/// Chords mirror lyrics: an ordered sublist keyed by `position`, with the
/// same application-enforced position uniqueness per song.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One chord line of a song
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chord {
    /// Unique chord ID
    pub id: Uuid,

    /// Song this line belongs to
    pub song_id: Uuid,

    /// Position within the song (app-enforced unique per song)
    pub position: i32,

    /// Chord notation (e.g. "G  D/F#  Em7  C")
    pub content: String,

    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a chord line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChord {
    /// Song ID
    pub song_id: Uuid,

    /// Position within the song
    pub position: i32,

    /// Chord notation
    pub content: String,
}

/// Input for updating a chord line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChord {
    /// New position
    pub position: Option<i32>,

    /// New chord notation
    pub content: Option<String>,
}

impl Chord {
    /// Creates a chord line
    ///
    /// Callers must first check `position_taken`.
    pub async fn create(pool: &PgPool, data: CreateChord) -> Result<Self, sqlx::Error> {
        let chord = sqlx::query_as::<_, Chord>(
            r#"
            INSERT INTO chords (song_id, position, content)
            VALUES ($1, $2, $3)
            RETURNING id, song_id, position, content, created_at
            "#,
        )
        .bind(data.song_id)
        .bind(data.position)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(chord)
    }

    /// Finds a chord line by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let chord = sqlx::query_as::<_, Chord>(
            "SELECT id, song_id, position, content, created_at FROM chords WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(chord)
    }

    /// Checks whether a position is already occupied in a song
    ///
    /// `exclude_id` skips one row — used when moving an existing line.
    pub async fn position_taken(
        pool: &PgPool,
        song_id: Uuid,
        position: i32,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM chords
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

    /// Updates a chord line
    ///
    /// # Returns
    ///
    /// The updated line if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateChord,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.position.is_none() && data.content.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE chords SET id = id");
        let mut bind_count = 1;

        if data.position.is_some() {
            bind_count += 1;
            query.push_str(&format!(", position = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id, song_id, position, content, created_at");

        let mut q = sqlx::query_as::<_, Chord>(&query).bind(id);

        if let Some(position) = data.position {
            q = q.bind(position);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }

        let chord = q.fetch_optional(pool).await?;

        Ok(chord)
    }

    /// Deletes a chord line by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chords WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a song's chord lines ordered by position
    pub async fn list_by_song(pool: &PgPool, song_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let chords = sqlx::query_as::<_, Chord>(
            r#"
            SELECT id, song_id, position, content, created_at
            FROM chords
            WHERE song_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(song_id)
        .fetch_all(pool)
        .await?;

        Ok(chords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_chord_default() {
        let update = UpdateChord::default();
        assert!(update.position.is_none());
        assert!(update.content.is_none());
    }
}
