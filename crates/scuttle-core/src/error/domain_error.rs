//! Account rule violations and wrapped storage failures

use thiserror::Error;

use crate::value_objects::UserId;

/// Errors raised by account rules and repositories
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Lookup
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // =========================================================================
    // Rejected input
    // =========================================================================
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Username is reserved: {0}")]
    ReservedUsername(String),

    // =========================================================================
    // Uniqueness
    // =========================================================================
    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Private key already in use")]
    PrivateKeyAlreadyExists,

    // =========================================================================
    // Storage
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Session store error: {0}")]
    CacheError(String),
}

impl DomainError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",

            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::ReservedUsername(_) => "RESERVED_USERNAME",

            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::PrivateKeyAlreadyExists => "PRIVATE_KEY_ALREADY_EXISTS",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
        }
    }

    /// The referenced account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Input was rejected before or by a rule check
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidUserId(_) | Self::ReservedUsername(_))
    }

    /// A unique username or private key is already taken
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::UsernameAlreadyExists | Self::PrivateKeyAlreadyExists
        )
    }

    /// Database or session store failed
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::CacheError(_))
    }
}

impl From<crate::value_objects::UserIdParseError> for DomainError {
    fn from(err: crate::value_objects::UserIdParseError) -> Self {
        Self::InvalidUserId(err.to_string())
    }
}
