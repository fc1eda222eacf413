//! Business logic services
//!
//! This module contains the service layer implementations that handle
//! validation and orchestration of account operations.

pub mod auth;
pub mod context;
pub mod error;
pub mod session;
pub mod user;
pub mod watch;

// Re-export all services for convenience
pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use session::{SessionContext, SESSION_STABLE_KEY};
pub use user::{UserService, MAX_PRIVATE_KEY_ATTEMPTS};
pub use watch::WatchService;
