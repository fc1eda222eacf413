//! # scuttle-core
//!
//! Domain layer for the bookmarking site's user accounts: entities, value objects,
//! validation rules, and the ports (repository, session, cookie) that the
//! infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod validation;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{NewUser, User, UserChanges, UserRef, WatchDirection};
pub use error::DomainError;
pub use traits::{
    Cookie, CookieJar, RepoResult, SessionStore, UserRepository, WatchRepository,
};
pub use validation::{is_valid_email, is_valid_username, USERNAME_MAX_LEN, USERNAME_MIN_LEN};
pub use value_objects::{Field, FieldMap, FieldParseError, UserId, UserIdParseError};
