/// Subscription model and database operations
///
/// A subscription ties a user to a band for event notifications.
/// Unsubscribing flips `active` to false; re-subscribing reactivates the
/// existing row rather than inserting a duplicate.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subscriptions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     band_id UUID NOT NULL REFERENCES bands(id) ON DELETE CASCADE,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, band_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subscription model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    /// Unique subscription ID
    pub id: Uuid,

    /// Subscribing user
    pub user_id: Uuid,

    /// Band subscribed to
    pub band_id: Uuid,

    /// Whether the subscription is active
    pub active: bool,

    /// When the subscription was first created
    pub created_at: DateTime<Utc>,
}

/// Subscription joined with band info, for a user's subscription listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubscriptionWithBand {
    /// Subscription ID
    pub id: Uuid,

    /// Subscribing user
    pub user_id: Uuid,

    /// Band subscribed to
    pub band_id: Uuid,

    /// Whether the subscription is active
    pub active: bool,

    /// When the subscription was first created
    pub created_at: DateTime<Utc>,

    /// Band name
    pub band_name: String,
}

impl Subscription {
    /// Subscribes a user to a band
    ///
    /// Upserts on (user, band): a previously deactivated subscription is
    /// reactivated instead of violating the unique constraint.
    pub async fn subscribe(
        pool: &PgPool,
        user_id: Uuid,
        band_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, band_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, band_id)
            DO UPDATE SET active = TRUE
            RETURNING id, user_id, band_id, active, created_at
            "#,
        )
        .bind(user_id)
        .bind(band_id)
        .fetch_one(pool)
        .await?;

        Ok(subscription)
    }

    /// Unsubscribes a user from a band by deactivating the subscription
    ///
    /// # Returns
    ///
    /// True if an active subscription was deactivated, false otherwise
    pub async fn unsubscribe(
        pool: &PgPool,
        user_id: Uuid,
        band_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET active = FALSE
            WHERE user_id = $1 AND band_id = $2 AND active = TRUE
            "#,
        )
        .bind(user_id)
        .bind(band_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a user's active subscriptions joined with band info
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<SubscriptionWithBand>, sqlx::Error> {
        let subscriptions = sqlx::query_as::<_, SubscriptionWithBand>(
            r#"
            SELECT s.id, s.user_id, s.band_id, s.active, s.created_at,
                   b.name AS band_name
            FROM subscriptions s
            JOIN bands b ON b.id = s.band_id
            WHERE s.user_id = $1 AND s.active = TRUE
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(subscriptions)
    }

    /// Lists active subscriber user IDs for a band
    pub async fn subscriber_ids(pool: &PgPool, band_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM subscriptions WHERE band_id = $1 AND active = TRUE",
        )
        .bind(band_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
