/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh, verification flows
/// - `users`: User accounts
/// - `churches`: Churches
/// - `memberships`: Church members
/// - `member_roles`: Church role assignments
/// - `bands`: Bands and band members
/// - `songs`: Band repertoire
/// - `lyrics`: Lyric sections of a song
/// - `chords`: Chord lines of a song
/// - `events`: Scheduled band events
/// - `subscriptions`: Band event subscriptions

use serde::Deserialize;

/// Pagination query parameters shared by list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationParams {
    /// Maximum number of items to return
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Number of items to skip
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

pub mod auth;
pub mod bands;
pub mod chords;
pub mod churches;
pub mod events;
pub mod health;
pub mod lyrics;
pub mod member_roles;
pub mod memberships;
pub mod songs;
pub mod subscriptions;
pub mod users;
