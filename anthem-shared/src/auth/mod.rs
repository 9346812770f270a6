/// Authentication and authorization for Anthem
///
/// # Modules
///
/// - `jwt`: JWT token generation and validation
/// - `password`: Argon2id password hashing and strength checks
/// - `middleware`: Axum middleware helpers and the request auth context
/// - `authorization`: Guard helpers (app role, identity, church, band)

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
