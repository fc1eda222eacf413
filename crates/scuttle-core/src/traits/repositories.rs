//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{NewUser, User, UserChanges, WatchDirection};
use crate::error::DomainError;
use crate::value_objects::{Field, FieldMap, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Snapshot of the logical to physical column mapping
    fn field_map(&self) -> FieldMap;

    /// Remap a logical field to another physical column
    fn set_field_name(&self, field: Field, column: String);

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by private key
    async fn find_by_private_key(&self, private_key: &str) -> RepoResult<Option<User>>;

    /// List users, newest id first; `None` means no limit
    async fn list(&self, limit: Option<i64>) -> RepoResult<Vec<User>>;

    /// Id of the user whose username and password hash both match
    async fn find_id_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> RepoResult<Option<UserId>>;

    /// Id of the user whose username and private key both match
    async fn find_id_by_private_key(
        &self,
        username: &str,
        private_key: &str,
    ) -> RepoResult<Option<UserId>>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Check whether any user holds the given private key
    async fn private_key_exists(&self, private_key: &str) -> RepoResult<bool>;

    /// Insert a new user and return the generated id
    async fn create(&self, user: &NewUser) -> RepoResult<UserId>;

    /// Overwrite the profile columns, and the password when a hash is given
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        password_hash: Option<&str>,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Update password hash
    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Hard delete a user row. Deleting an unknown id is not an error.
    async fn delete(&self, id: UserId) -> RepoResult<()>;

    /// Remove every user row
    async fn delete_all(&self) -> RepoResult<()>;
}

// ============================================================================
// Watch Repository
// ============================================================================

#[async_trait]
pub trait WatchRepository: Send + Sync {
    /// Ids watched by `watcher`
    async fn find_watched_ids(&self, watcher: UserId) -> RepoResult<Vec<UserId>>;

    /// Usernames on one side of `user`'s watch relationships, sorted by username
    async fn find_names(&self, user: UserId, direction: WatchDirection)
        -> RepoResult<Vec<String>>;

    /// Check whether `watcher` watches `watched`
    async fn exists(&self, watcher: UserId, watched: UserId) -> RepoResult<bool>;

    /// Insert the pair if absent, delete it if present; returns the new status
    async fn toggle(&self, watcher: UserId, watched: UserId) -> RepoResult<bool>;

    /// Remove every watch row
    async fn delete_all(&self) -> RepoResult<()>;
}
