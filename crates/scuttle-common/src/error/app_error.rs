//! Application error types
//!
//! Errors handed to the web layer, each classified by [`ErrorKind`] so the
//! caller can pick a response without matching on every variant.

use scuttle_core::DomainError;
use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Login failed or a login is required
    Unauthenticated,
    /// Input rejected before touching storage
    Invalid,
    NotFound,
    /// Username or private key already taken
    Conflict,
    /// Database or session store failure
    Storage,
    Internal,
}

impl ErrorKind {
    /// Classify a domain error
    pub fn of_domain(err: &DomainError) -> Self {
        match err {
            DomainError::UserNotFound(_) => Self::NotFound,
            DomainError::InvalidUserId(_) | DomainError::ReservedUsername(_) => Self::Invalid,
            DomainError::UsernameAlreadyExists | DomainError::PrivateKeyAlreadyExists => {
                Self::Conflict
            }
            DomainError::DatabaseError(_) | DomainError::CacheError(_) => Self::Storage,
        }
    }

    /// HTTP status a web layer would answer with
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Invalid => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Storage | Self::Internal => 500,
        }
    }
}

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Same error for an unknown user and a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in")]
    MissingAuth,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials | Self::MissingAuth => ErrorKind::Unauthenticated,
            Self::Validation(_) => ErrorKind::Invalid,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Domain(e) => ErrorKind::of_domain(e),
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Stable code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Domain(e) => e.code(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the caller, not the server, is at fault
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Storage | ErrorKind::Internal)
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Error body for API responses.
///
/// Server-side failures get a generic message so storage details never
/// reach the client.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            "Internal error".to_string()
        };
        Self {
            code: err.error_code().to_string(),
            kind: err.kind(),
            message,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
