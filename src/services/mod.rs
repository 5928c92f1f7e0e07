//! Domain services orchestrating the store, ID generator, token service
//! and authorization policy.

pub mod auth;
pub mod community;
pub mod member;

use thiserror::Error;

use crate::slug::MAX_SLUG_ATTEMPTS;

pub use auth::AuthService;
pub use community::CommunityService;
pub use member::MemberService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid password")]
    InvalidCredentials,

    /// Token was valid but the user it names no longer exists.
    #[error("User not found")]
    UnknownUser,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Required seed data is absent (e.g. the role catalog).
    #[error("{0}")]
    Configuration(String),

    #[error("Slug allocation exhausted after {MAX_SLUG_ATTEMPTS} attempts")]
    SlugAllocationExhausted,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Timestamp convention for all persisted records.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
