/// Authentication middleware support for Axum
///
/// The API server validates a Bearer JWT per request and stores an
/// `AuthContext` in request extensions; handlers extract it with Axum's
/// `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use anthem_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::AppRole;

/// Authentication context added to request extensions
///
/// Present on every request that passed the JWT middleware.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Application role from the token claims
    pub role: AppRole,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid, role: AppRole) -> Self {
        Self { user_id, role }
    }

    /// Whether the authenticated user is an application admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials provided
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials are malformed (e.g. not a Bearer token)
    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),

    /// Token failed validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Extracts the Bearer token from an Authorization header value
///
/// # Errors
///
/// Returns `AuthError::InvalidFormat` when the header doesn't carry a
/// Bearer token
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_from_jwt() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext::from_jwt(user_id, AppRole::Admin);

        assert_eq!(auth.user_id, user_id);
        assert!(auth.is_admin());

        let member = AuthContext::from_jwt(user_id, AppRole::Member);
        assert!(!member.is_admin());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123").unwrap(), "abc123");
        assert!(extract_bearer_token("Basic abc123").is_err());
        assert!(extract_bearer_token("abc123").is_err());
    }
}
