/// Temporal token pool
///
/// A temporal token is a single-use, purpose-tagged secret with an expiry:
/// email verification, password reset, or WhatsApp phone verification. The
/// plaintext secret is handed to the user exactly once; only its SHA-256
/// digest is persisted, and redemption hashes the presented token and
/// matches server-side.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE token_purpose AS ENUM
///     ('email_verification', 'password_reset', 'phone_verification');
///
/// CREATE TABLE temporal_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     purpose token_purpose NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     expires_at TIMESTAMPTZ NOT NULL,
///     consumed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Issuing a token for a (user, purpose) pair invalidates any prior
/// un-consumed token of the same pair. A token is redeemable iff un-consumed
/// and un-expired; redemption stamps `consumed_at`.
///
/// # Example
///
/// ```no_run
/// use anthem_shared::models::temporal_token::{TemporalToken, TokenPurpose};
/// use anthem_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// // Issue: the plaintext secret goes out-of-band to the user
/// let (secret, token) = TemporalToken::issue(
///     &pool, user_id, TokenPurpose::EmailVerification,
/// ).await?;
///
/// // Redeem: hash the presented secret and match
/// let redeemed = TemporalToken::redeem(
///     &pool, &secret, TokenPurpose::EmailVerification,
/// ).await?;
/// assert!(redeemed.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Length of the raw token secret in bytes (hex-encoded on the wire)
const TOKEN_SECRET_BYTES: usize = 32;

/// What a temporal token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Confirms ownership of the account's email address
    EmailVerification,

    /// Authorizes a password reset
    PasswordReset,

    /// Confirms ownership of the account's phone number (via WhatsApp)
    PhoneVerification,
}

impl TokenPurpose {
    /// Converts purpose to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::PhoneVerification => "phone_verification",
        }
    }

    /// Lifetime of a token issued for this purpose
    ///
    /// Password resets and phone codes are deliberately short-lived.
    pub fn lifetime(&self) -> Duration {
        match self {
            TokenPurpose::EmailVerification => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::hours(1),
            TokenPurpose::PhoneVerification => Duration::minutes(10),
        }
    }
}

/// Temporal token record (digest only, never the plaintext secret)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TemporalToken {
    /// Unique token ID
    pub id: Uuid,

    /// SHA-256 digest of the secret, hex-encoded
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// Purpose the token was issued for
    pub purpose: TokenPurpose,

    /// User the token belongs to
    pub user_id: Uuid,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// When the token was redeemed (None while live)
    pub consumed_at: Option<DateTime<Utc>>,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

/// Generates a random token secret (hex-encoded)
fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; TOKEN_SECRET_BYTES] = rng.gen();
    hex::encode(bytes)
}

/// Hashes a token secret for storage and lookup
///
/// SHA-256 is enough here: the secret has 256 bits of entropy, so no
/// brute-force-resistant (slow) hash is needed, unlike passwords.
pub fn hash_token(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl TemporalToken {
    /// Issues a new token for a user and purpose
    ///
    /// Any prior un-consumed token of the same (user, purpose) pair is
    /// consumed first, so at most one token per pair is live.
    ///
    /// # Returns
    ///
    /// The plaintext secret (to deliver out-of-band) and the stored record.
    /// The secret cannot be recovered later.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<(String, Self), sqlx::Error> {
        let secret = generate_secret();
        let token_hash = hash_token(&secret);
        let expires_at = Utc::now() + purpose.lifetime();

        let mut tx = pool.begin().await?;

        // Invalidate earlier tokens for the same pair
        sqlx::query(
            r#"
            UPDATE temporal_tokens SET consumed_at = NOW()
            WHERE user_id = $1 AND purpose = $2 AND consumed_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(purpose)
        .execute(&mut *tx)
        .await?;

        let token = sqlx::query_as::<_, TemporalToken>(
            r#"
            INSERT INTO temporal_tokens (token_hash, purpose, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token_hash, purpose, user_id, expires_at, consumed_at, created_at
            "#,
        )
        .bind(token_hash)
        .bind(purpose)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((secret, token))
    }

    /// Redeems a token secret for the given purpose
    ///
    /// Hashes the presented secret, matches it server-side, and rejects
    /// tokens that are consumed, expired, or issued for another purpose.
    /// Redemption is single-use: the matched row is stamped `consumed_at`
    /// in the same statement, so a second redemption finds nothing.
    ///
    /// # Returns
    ///
    /// The consumed token record if redemption succeeded, None otherwise
    pub async fn redeem(
        pool: &PgPool,
        secret: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token_hash = hash_token(secret);

        let token = sqlx::query_as::<_, TemporalToken>(
            r#"
            UPDATE temporal_tokens SET consumed_at = NOW()
            WHERE token_hash = $1
              AND purpose = $2
              AND consumed_at IS NULL
              AND expires_at > NOW()
            RETURNING id, token_hash, purpose, user_id, expires_at, consumed_at, created_at
            "#,
        )
        .bind(token_hash)
        .bind(purpose)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Deletes expired and consumed tokens older than `keep_for`
    ///
    /// Housekeeping for the pool; safe to run at any time.
    ///
    /// # Returns
    ///
    /// Number of rows removed
    pub async fn prune(pool: &PgPool, keep_for: Duration) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - keep_for;

        let result = sqlx::query(
            r#"
            DELETE FROM temporal_tokens
            WHERE (consumed_at IS NOT NULL AND consumed_at < $1)
               OR expires_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Whether this token is still redeemable
    pub fn is_live(&self) -> bool {
        self.consumed_at.is_none() && self.expires_at > Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_is_random() {
        let s1 = generate_secret();
        let s2 = generate_secret();

        assert_eq!(s1.len(), TOKEN_SECRET_BYTES * 2); // hex doubles length
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_hash_token_is_stable() {
        let secret = "deadbeef";
        assert_eq!(hash_token(secret), hash_token(secret));
        assert_eq!(hash_token(secret).len(), 64); // SHA-256 hex
        assert_ne!(hash_token(secret), hash_token("deadbeee"));
    }

    #[test]
    fn test_purpose_lifetimes() {
        assert_eq!(
            TokenPurpose::EmailVerification.lifetime(),
            Duration::hours(24)
        );
        assert_eq!(TokenPurpose::PasswordReset.lifetime(), Duration::hours(1));
        assert_eq!(
            TokenPurpose::PhoneVerification.lifetime(),
            Duration::minutes(10)
        );
    }

    #[test]
    fn test_is_live() {
        let token = TemporalToken {
            id: Uuid::new_v4(),
            token_hash: hash_token("secret"),
            purpose: TokenPurpose::PasswordReset,
            user_id: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::hours(1),
            consumed_at: None,
            created_at: Utc::now(),
        };
        assert!(token.is_live());

        let consumed = TemporalToken {
            consumed_at: Some(Utc::now()),
            ..token.clone()
        };
        assert!(!consumed.is_live());

        let expired = TemporalToken {
            expires_at: Utc::now() - Duration::minutes(1),
            ..token
        };
        assert!(!expired.is_live());
    }
}
