//! User entity - represents a bookmarking site account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Stored user account.
///
/// The password hash is deliberately not part of the entity; repositories
/// expose it separately for authentication only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Display name shown on the profile page
    pub name: Option<String>,
    pub homepage: Option<String>,
    /// Free-form profile text
    pub content: Option<String>,
    pub private_key: Option<String>,
    pub enable_private_key: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl User {
    /// Lightweight reference to this user
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
        }
    }

    /// Check if the private key feature is usable for this account
    #[inline]
    pub fn has_active_private_key(&self) -> bool {
        self.enable_private_key && self.private_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Id and username only, used for listings and id resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
}

/// Row to insert for a new account.
///
/// Carries the already-hashed password; creation performs no validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub private_key: Option<String>,
    pub enable_private_key: bool,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Create a new account row stamped with the current UTC time
    pub fn new(username: String, password_hash: String, email: String) -> Self {
        Self {
            username,
            password_hash,
            email,
            private_key: None,
            enable_private_key: false,
            created_at: Utc::now(),
        }
    }

    /// Attach a private key and its enable flag
    pub fn with_private_key(mut self, private_key: Option<String>, enabled: bool) -> Self {
        self.private_key = private_key;
        self.enable_private_key = enabled;
        self
    }
}

/// Full replacement of the editable profile columns.
///
/// Every field is written as given; there are no partial-update semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: String,
    pub homepage: Option<String>,
    pub content: Option<String>,
    pub private_key: Option<String>,
    pub enable_private_key: bool,
}
