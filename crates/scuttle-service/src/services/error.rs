//! Service layer error types

use scuttle_common::{AppError, ErrorKind};
use scuttle_core::DomainError;

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Domain rule violation or storage failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Authentication and other application errors
    #[error(transparent)]
    App(#[from] AppError),

    /// Input rejected before any storage access
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Credentials did not match; says nothing about which part was wrong
    pub fn invalid_credentials() -> Self {
        Self::App(AppError::InvalidCredentials)
    }

    /// Operation needs a logged-on user
    pub fn missing_auth() -> Self {
        Self::App(AppError::MissingAuth)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => ErrorKind::of_domain(e),
            Self::App(e) => e.kind(),
            Self::Validation(_) => ErrorKind::Invalid,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Unauthenticated
    }

    /// Check if a database or session store failed
    pub fn is_storage_failure(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
