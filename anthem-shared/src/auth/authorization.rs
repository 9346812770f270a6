/// Authorization helpers and permission checks
///
/// Guard-style checks that run at the top of route handlers, mirroring the
/// decorator checks the API exposes: login status is the JWT middleware's
/// job; the helpers here cover app role, user identity, church scope, and
/// band scope.
///
/// # Permission model
///
/// 1. **App role**: `admin` passes every check below
/// 2. **User identity**: a user may act on their own resources
/// 3. **Church scope**: active membership in the church; some operations
///    additionally require an open role assignment (e.g. `pastor`)
/// 4. **Band scope**: band member or band creator
///
/// # Example
///
/// ```no_run
/// use anthem_shared::auth::authorization::{require_admin, require_church_membership};
/// use anthem_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: &PgPool, auth: &AuthContext, church_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_church_membership(pool, auth, church_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::band::{Band, BandMember};
use crate::models::member_role::{ChurchRole, MemberRole};
use crate::models::membership::Membership;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User doesn't have the admin app role
    #[error("Administrator access required")]
    NotAdmin,

    /// User is acting on another user's resource
    #[error("Not authorized to access this user's resources")]
    NotSelf,

    /// User is not an active member of the church
    #[error("Not a member of church {0}")]
    NotChurchMember(Uuid),

    /// User doesn't hold the required church role
    #[error("Requires the {0} role in this church")]
    MissingChurchRole(&'static str),

    /// User is not a member or creator of the band
    #[error("Not a member of band {0}")]
    NotBandMember(Uuid),

    /// Referenced resource doesn't exist
    #[error("Resource not found")]
    NotFound,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Requires the admin application role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::NotAdmin)
    }
}

/// Requires the request to act on the authenticated user, or admin
pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin() || auth.user_id == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotSelf)
    }
}

/// Requires an active membership in the church (admins pass implicitly)
pub async fn require_church_membership(
    pool: &PgPool,
    auth: &AuthContext,
    church_id: Uuid,
) -> Result<(), AuthzError> {
    if auth.is_admin() {
        return Ok(());
    }

    let is_member = Membership::is_active_member(pool, church_id, auth.user_id).await?;

    if !is_member {
        return Err(AuthzError::NotChurchMember(church_id));
    }

    Ok(())
}

/// Requires an open role assignment in the church (admins pass implicitly)
pub async fn require_church_role(
    pool: &PgPool,
    auth: &AuthContext,
    church_id: Uuid,
    role: ChurchRole,
) -> Result<(), AuthzError> {
    if auth.is_admin() {
        return Ok(());
    }

    let has_role = MemberRole::user_has_open_role(pool, church_id, auth.user_id, role).await?;

    if !has_role {
        return Err(AuthzError::MissingChurchRole(role.as_str()));
    }

    Ok(())
}

/// Requires band membership or creatorship (admins pass implicitly)
///
/// # Errors
///
/// Returns `AuthzError::NotFound` when the band doesn't exist, so handlers
/// surface a 404 rather than leaking authorization state.
pub async fn require_band_access(
    pool: &PgPool,
    auth: &AuthContext,
    band_id: Uuid,
) -> Result<(), AuthzError> {
    let band = Band::find_by_id(pool, band_id)
        .await?
        .ok_or(AuthzError::NotFound)?;

    if auth.is_admin() || band.created_by == auth.user_id {
        return Ok(());
    }

    let is_member = BandMember::is_member(pool, band_id, auth.user_id).await?;

    if !is_member {
        return Err(AuthzError::NotBandMember(band_id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::AppRole;

    fn ctx(role: AppRole) -> AuthContext {
        AuthContext::from_jwt(Uuid::new_v4(), role)
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&ctx(AppRole::Admin)).is_ok());
        assert!(matches!(
            require_admin(&ctx(AppRole::Member)),
            Err(AuthzError::NotAdmin)
        ));
    }

    #[test]
    fn test_require_self_or_admin() {
        let auth = ctx(AppRole::Member);

        // Acting on self
        assert!(require_self_or_admin(&auth, auth.user_id).is_ok());

        // Acting on someone else
        assert!(matches!(
            require_self_or_admin(&auth, Uuid::new_v4()),
            Err(AuthzError::NotSelf)
        ));

        // Admin may act on anyone
        assert!(require_self_or_admin(&ctx(AppRole::Admin), Uuid::new_v4()).is_ok());
    }
}
