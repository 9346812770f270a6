/// Song model and database operations
///
/// Songs make up a band's repertoire. Lyrics and chords are ordered sublists
/// living in their own tables (see `lyric` and `chord`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE songs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     author VARCHAR(255),
///     musical_key VARCHAR(12),
///     tempo INTEGER,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Song model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    /// Unique song ID
    pub id: Uuid,

    /// Band whose repertoire this song belongs to
    pub band_id: Uuid,

    /// Song title
    pub title: String,

    /// Optional author/composer
    pub author: Option<String>,

    /// Optional musical key (e.g. "G", "F#m")
    pub musical_key: Option<String>,

    /// Optional tempo in BPM
    pub tempo: Option<i32>,

    /// When the song was created
    pub created_at: DateTime<Utc>,

    /// When the song was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSong {
    /// Band ID
    pub band_id: Uuid,

    /// Song title
    pub title: String,

    /// Optional author/composer
    pub author: Option<String>,

    /// Optional musical key
    pub musical_key: Option<String>,

    /// Optional tempo in BPM
    pub tempo: Option<i32>,
}

/// Input for updating an existing song
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSong {
    /// New title
    pub title: Option<String>,

    /// New author (use Some(None) to clear)
    pub author: Option<Option<String>>,

    /// New musical key (use Some(None) to clear)
    pub musical_key: Option<Option<String>>,

    /// New tempo (use Some(None) to clear)
    pub tempo: Option<Option<i32>>,
}

impl Song {
    /// Creates a new song
    pub async fn create(pool: &PgPool, data: CreateSong) -> Result<Self, sqlx::Error> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (band_id, title, author, musical_key, tempo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, band_id, title, author, musical_key, tempo, created_at, updated_at
            "#,
        )
        .bind(data.band_id)
        .bind(data.title)
        .bind(data.author)
        .bind(data.musical_key)
        .bind(data.tempo)
        .fetch_one(pool)
        .await?;

        Ok(song)
    }

    /// Finds a song by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let song = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, band_id, title, author, musical_key, tempo, created_at, updated_at
            FROM songs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(song)
    }

    /// Updates an existing song
    ///
    /// # Returns
    ///
    /// The updated song if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSong,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE songs SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.author.is_some() {
            bind_count += 1;
            query.push_str(&format!(", author = ${}", bind_count));
        }
        if data.musical_key.is_some() {
            bind_count += 1;
            query.push_str(&format!(", musical_key = ${}", bind_count));
        }
        if data.tempo.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tempo = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 \
             RETURNING id, band_id, title, author, musical_key, tempo, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Song>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(author_opt) = data.author {
            q = q.bind(author_opt);
        }
        if let Some(key_opt) = data.musical_key {
            q = q.bind(key_opt);
        }
        if let Some(tempo_opt) = data.tempo {
            q = q.bind(tempo_opt);
        }

        let song = q.fetch_optional(pool).await?;

        Ok(song)
    }

    /// Deletes a song by ID
    ///
    /// Cascades to its lyrics and chords.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a band's songs with pagination, ordered by title
    pub async fn list_by_band(
        pool: &PgPool,
        band_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let songs = sqlx::query_as::<_, Song>(
            r#"
            SELECT id, band_id, title, author, musical_key, tempo, created_at, updated_at
            FROM songs
            WHERE band_id = $1
            ORDER BY title ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(band_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(songs)
    }

    /// Counts a band's songs
    pub async fn count_by_band(pool: &PgPool, band_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs WHERE band_id = $1")
            .bind(band_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_song_default() {
        let update = UpdateSong::default();
        assert!(update.title.is_none());
        assert!(update.author.is_none());
        assert!(update.musical_key.is_none());
        assert!(update.tempo.is_none());
    }
}
