/// Event model and database operations
///
/// Events are scheduled per band: services, rehearsals, and anything else a
/// band gathers for.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     location VARCHAR(255),
///     starts_at TIMESTAMPTZ NOT NULL,
///     ends_at TIMESTAMPTZ,
///     notes TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Event model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Band the event is scheduled for
    pub band_id: Uuid,

    /// Event title
    pub title: String,

    /// Optional location
    pub location: Option<String>,

    /// When the event starts
    pub starts_at: DateTime<Utc>,

    /// When the event ends (None if open-ended)
    pub ends_at: Option<DateTime<Utc>>,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// When the event was created
    pub created_at: DateTime<Utc>,

    /// When the event was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    /// Band ID
    pub band_id: Uuid,

    /// Event title
    pub title: String,

    /// Optional location
    pub location: Option<String>,

    /// When the event starts
    pub starts_at: DateTime<Utc>,

    /// Optional end time
    pub ends_at: Option<DateTime<Utc>>,

    /// Optional notes
    pub notes: Option<String>,
}

/// Input for updating an existing event
///
/// Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// New title
    pub title: Option<String>,

    /// New location (use Some(None) to clear)
    pub location: Option<Option<String>>,

    /// New start time
    pub starts_at: Option<DateTime<Utc>>,

    /// New end time (use Some(None) to clear)
    pub ends_at: Option<Option<DateTime<Utc>>>,

    /// New notes (use Some(None) to clear)
    pub notes: Option<Option<String>>,
}

impl Event {
    /// Creates a new event
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (band_id, title, location, starts_at, ends_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, band_id, title, location, starts_at, ends_at, notes,
                      created_at, updated_at
            "#,
        )
        .bind(data.band_id)
        .bind(data.title)
        .bind(data.location)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Finds an event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, band_id, title, location, starts_at, ends_at, notes,
                   created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Updates an existing event
    ///
    /// # Returns
    ///
    /// The updated event if found, None otherwise
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE events SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.location.is_some() {
            bind_count += 1;
            query.push_str(&format!(", location = ${}", bind_count));
        }
        if data.starts_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", starts_at = ${}", bind_count));
        }
        if data.ends_at.is_some() {
            bind_count += 1;
            query.push_str(&format!(", ends_at = ${}", bind_count));
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 \
             RETURNING id, band_id, title, location, starts_at, ends_at, notes, \
                       created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Event>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(location_opt) = data.location {
            q = q.bind(location_opt);
        }
        if let Some(starts_at) = data.starts_at {
            q = q.bind(starts_at);
        }
        if let Some(ends_at_opt) = data.ends_at {
            q = q.bind(ends_at_opt);
        }
        if let Some(notes_opt) = data.notes {
            q = q.bind(notes_opt);
        }

        let event = q.fetch_optional(pool).await?;

        Ok(event)
    }

    /// Deletes an event by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a band's events with pagination, soonest first
    pub async fn list_by_band(
        pool: &PgPool,
        band_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, band_id, title, location, starts_at, ends_at, notes,
                   created_at, updated_at
            FROM events
            WHERE band_id = $1
            ORDER BY starts_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(band_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_event_default() {
        let update = UpdateEvent::default();
        assert!(update.title.is_none());
        assert!(update.location.is_none());
        assert!(update.starts_at.is_none());
        assert!(update.ends_at.is_none());
        assert!(update.notes.is_none());
    }
}
