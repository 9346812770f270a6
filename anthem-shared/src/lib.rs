//! # Anthem Shared Library
//!
//! This crate contains shared types, utilities, and data access used across
//! the Anthem API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migration runner
//! - `notify`: Outbound notification seam (email, WhatsApp)

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;

/// Current version of the Anthem shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
