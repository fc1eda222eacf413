//! Per-request session context
//!
//! Owns the client's session store and cookie jar, and caches the resolved
//! current user for the rest of the request.

use scuttle_core::{CookieJar, SessionStore, User, UserId};
use tracing::debug;

use super::error::ServiceResult;

/// Session flag recording whether the session survived a round trip
pub const SESSION_STABLE_KEY: &str = "sessionStable";

/// Identity state for one client request.
///
/// The current user id moves from unresolved to resolved (some id or none)
/// the first time it is asked for, and back to unresolved whenever the
/// identity changes.
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    cookies: Box<dyn CookieJar>,
    current_id: Option<Option<UserId>>,
    current_user: Option<Option<User>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("current_id", &self.current_id)
            .field("user_cached", &self.current_user.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Open a context over the client's session and cookies
    pub fn new(store: impl SessionStore + 'static, cookies: impl CookieJar + 'static) -> Self {
        Self {
            store: Box::new(store),
            cookies: Box::new(cookies),
            current_id: None,
            current_user: None,
        }
    }

    /// Open a context and bump the session stability flag, once per request
    pub async fn open(
        store: impl SessionStore + 'static,
        cookies: impl CookieJar + 'static,
    ) -> ServiceResult<Self> {
        let session = Self::new(store, cookies);
        session.update_session_stability().await?;
        Ok(session)
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn cookies(&self) -> &dyn CookieJar {
        self.cookies.as_ref()
    }

    pub fn cookies_mut(&mut self) -> &mut dyn CookieJar {
        self.cookies.as_mut()
    }

    /// Set `sessionStable` to 0 the first time, 1 on every later request
    pub async fn update_session_stability(&self) -> ServiceResult<()> {
        let seen = self.store.get(SESSION_STABLE_KEY).await?.is_some();
        self.store
            .set(SESSION_STABLE_KEY, if seen { "1" } else { "0" })
            .await?;
        debug!(stable = seen, "Session stability updated");
        Ok(())
    }

    /// True once the session has been carried over from an earlier request
    pub async fn is_session_stable(&self) -> ServiceResult<bool> {
        Ok(self.store.get(SESSION_STABLE_KEY).await?.as_deref() == Some("1"))
    }

    /// Resolved current user id, if resolution already ran
    pub(crate) fn cached_id(&self) -> Option<Option<UserId>> {
        self.current_id
    }

    pub(crate) fn cache_id(&mut self, id: Option<UserId>) {
        if self.current_id != Some(id) {
            self.current_user = None;
        }
        self.current_id = Some(id);
    }

    pub(crate) fn cached_user(&self) -> Option<&Option<User>> {
        self.current_user.as_ref()
    }

    pub(crate) fn cache_user(&mut self, user: Option<User>) {
        self.current_user = Some(user);
    }

    /// Forget everything resolved so far
    pub(crate) fn invalidate(&mut self) {
        self.current_id = None;
        self.current_user = None;
    }
}
