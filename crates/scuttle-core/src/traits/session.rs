//! Session and cookie ports
//!
//! The web layer owns the transport; the account service only needs a
//! key-value view of the current session and of the request's cookies.

use async_trait::async_trait;

use super::repositories::RepoResult;

/// Key-value store scoped to one client session
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a session value
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Write a session value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> RepoResult<()>;

    /// Remove a single session value
    async fn remove(&self, key: &str) -> RepoResult<()>;

    /// Drop every value in the session
    async fn clear(&self) -> RepoResult<()>;
}

/// Cookie to send back to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lifetime in seconds; `Some(0)` expires the cookie immediately
    pub max_age: Option<i64>,
    pub path: String,
}

impl Cookie {
    /// Persistent cookie scoped to `path`
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        max_age: i64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: Some(max_age),
            path: path.into(),
        }
    }

    /// Cookie that tells the client to delete `name`
    pub fn removal(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            max_age: Some(0),
            path: path.into(),
        }
    }

    /// Check if this cookie deletes the client's copy
    #[inline]
    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }
}

/// Request cookies plus the changes to send in the response
pub trait CookieJar: Send + Sync {
    /// Value of a cookie sent by the client
    fn get(&self, name: &str) -> Option<String>;

    /// Queue a cookie for the response
    fn set(&mut self, cookie: Cookie);

    /// Forget the client's cookie and queue its removal
    fn remove(&mut self, name: &str, path: &str);
}
