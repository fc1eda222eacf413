//! Process-local session store and cookie jar.
//!
//! Both are cheap handles over shared state: clone one before handing it to
//! a [`crate::SessionContext`] and the clone still sees every change, which
//! is how a web layer reads back the cookies to send.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use scuttle_core::{Cookie, CookieJar, RepoResult, SessionStore};

/// Session values held in memory for a single client
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.values
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> RepoResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> RepoResult<()> {
        self.values.lock().clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
struct JarState {
    incoming: HashMap<String, String>,
    pending: Vec<Cookie>,
}

/// Request cookies plus the `Set-Cookie` changes queued for the response
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    state: Arc<Mutex<JarState>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar holding the cookies a client sent
    pub fn with_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let jar = Self::new();
        jar.state.lock().incoming = cookies
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        jar
    }

    /// Cookies queued for the response, in order
    pub fn pending(&self) -> Vec<Cookie> {
        self.state.lock().pending.clone()
    }

    /// Take the queued cookies, leaving none behind
    pub fn take_pending(&self) -> Vec<Cookie> {
        std::mem::take(&mut self.state.lock().pending)
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.state.lock().incoming.get(name).cloned()
    }

    /// Queued only; the client sends it back from the next request on
    fn set(&mut self, cookie: Cookie) {
        self.state.lock().pending.push(cookie);
    }

    fn remove(&mut self, name: &str, path: &str) {
        let mut state = self.state.lock();
        state.incoming.remove(name);
        state.pending.push(Cookie::removal(name, path));
    }
}
