//! In-memory repositories for tests
//!
//! Behave like the PostgreSQL repositories: generated ids count up from 1,
//! usernames and non-empty private keys are unique, and deleting a user
//! leaves its watch rows alone. Every storage call is counted, and a
//! repository can be switched into failing mode to exercise error paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use scuttle_common::AccountConfig;
use scuttle_core::{
    DomainError, Field, FieldMap, NewUser, RepoResult, User, UserChanges, UserId, UserRepository,
    WatchDirection, WatchRepository,
};

use crate::services::ServiceContext;

#[derive(Debug, Default)]
struct Probe {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl Probe {
    fn hit(&self) -> RepoResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("storage unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Row {
    user: User,
    password_hash: String,
}

#[derive(Debug)]
struct UserState {
    rows: BTreeMap<i64, Row>,
    next_id: i64,
    fields: FieldMap,
    /// Private key checks still to be answered "taken"
    forced_key_hits: usize,
    /// Keys reported as taken by a forced answer
    forced_keys: Vec<String>,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            fields: FieldMap::default(),
            forced_key_hits: 0,
            forced_keys: Vec::new(),
        }
    }
}

/// In-memory `UserRepository`; clones share the same rows
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<Mutex<UserState>>,
    probe: Arc<Probe>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage calls made so far
    pub fn calls(&self) -> usize {
        self.probe.calls.load(Ordering::SeqCst)
    }

    /// Make every following storage call fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.probe.failing.store(failing, Ordering::SeqCst);
    }

    /// Stored password hash, bypassing the call counter
    pub fn stored_hash(&self, id: UserId) -> Option<String> {
        self.state
            .lock()
            .rows
            .get(&id.into_inner())
            .map(|r| r.password_hash.clone())
    }

    /// Report the next `n` private key checks as taken, whatever the key
    pub fn force_private_key_hits(&self, n: usize) {
        self.state.lock().forced_key_hits = n;
    }

    /// Keys that a forced check reported as taken, in order
    pub fn forced_private_keys(&self) -> Vec<String> {
        self.state.lock().forced_keys.clone()
    }

    fn username_of(&self, id: UserId) -> Option<String> {
        self.state
            .lock()
            .rows
            .get(&id.into_inner())
            .map(|r| r.user.username.clone())
    }

    fn find_where(&self, pred: impl Fn(&Row) -> bool) -> Option<Row> {
        self.state.lock().rows.values().find(|r| pred(r)).cloned()
    }
}

fn key_taken(rows: &BTreeMap<i64, Row>, key: Option<&str>, except: Option<i64>) -> bool {
    let Some(key) = key.filter(|k| !k.is_empty()) else {
        return false;
    };
    rows.iter()
        .any(|(id, r)| Some(*id) != except && r.user.private_key.as_deref() == Some(key))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    fn field_map(&self) -> FieldMap {
        self.state.lock().fields.clone()
    }

    fn set_field_name(&self, field: Field, column: String) {
        self.state.lock().fields.set(field, column);
    }

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.probe.hit()?;
        Ok(self
            .state
            .lock()
            .rows
            .get(&id.into_inner())
            .map(|r| r.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.probe.hit()?;
        Ok(self
            .find_where(|r| r.user.username == username)
            .map(|r| r.user))
    }

    async fn find_by_private_key(&self, private_key: &str) -> RepoResult<Option<User>> {
        self.probe.hit()?;
        Ok(self
            .find_where(|r| r.user.private_key.as_deref() == Some(private_key))
            .map(|r| r.user))
    }

    async fn list(&self, limit: Option<i64>) -> RepoResult<Vec<User>> {
        self.probe.hit()?;
        let state = self.state.lock();
        let users = state.rows.values().rev().map(|r| r.user.clone());
        Ok(match limit {
            Some(n) => users.take(usize::try_from(n).unwrap_or(0)).collect(),
            None => users.collect(),
        })
    }

    async fn find_id_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> RepoResult<Option<UserId>> {
        self.probe.hit()?;
        Ok(self
            .find_where(|r| r.user.username == username && r.password_hash == password_hash)
            .map(|r| r.user.id))
    }

    async fn find_id_by_private_key(
        &self,
        username: &str,
        private_key: &str,
    ) -> RepoResult<Option<UserId>> {
        self.probe.hit()?;
        Ok(self
            .find_where(|r| {
                r.user.username == username && r.user.private_key.as_deref() == Some(private_key)
            })
            .map(|r| r.user.id))
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        self.probe.hit()?;
        Ok(self.stored_hash(id))
    }

    async fn private_key_exists(&self, private_key: &str) -> RepoResult<bool> {
        self.probe.hit()?;
        let mut state = self.state.lock();
        if state.forced_key_hits > 0 {
            state.forced_key_hits -= 1;
            state.forced_keys.push(private_key.to_string());
            return Ok(true);
        }
        Ok(key_taken(&state.rows, Some(private_key), None))
    }

    async fn create(&self, user: &NewUser) -> RepoResult<UserId> {
        self.probe.hit()?;
        let mut state = self.state.lock();

        if state.rows.values().any(|r| r.user.username == user.username) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if key_taken(&state.rows, user.private_key.as_deref(), None) {
            return Err(DomainError::PrivateKeyAlreadyExists);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.rows.insert(
            id,
            Row {
                user: User {
                    id: UserId::new(id),
                    username: user.username.clone(),
                    email: user.email.clone(),
                    name: None,
                    homepage: None,
                    content: None,
                    private_key: user.private_key.clone().filter(|k| !k.is_empty()),
                    enable_private_key: user.enable_private_key,
                    created_at: user.created_at,
                    modified_at: user.created_at,
                },
                password_hash: user.password_hash.clone(),
            },
        );

        Ok(UserId::new(id))
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        password_hash: Option<&str>,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.probe.hit()?;
        let mut state = self.state.lock();

        if key_taken(
            &state.rows,
            changes.private_key.as_deref(),
            Some(id.into_inner()),
        ) {
            return Err(DomainError::PrivateKeyAlreadyExists);
        }

        if let Some(row) = state.rows.get_mut(&id.into_inner()) {
            row.user.name.clone_from(&changes.name);
            row.user.email.clone_from(&changes.email);
            row.user.homepage.clone_from(&changes.homepage);
            row.user.content.clone_from(&changes.content);
            row.user.private_key = changes.private_key.clone().filter(|k| !k.is_empty());
            row.user.enable_private_key = changes.enable_private_key;
            row.user.modified_at = modified_at;
            if let Some(hash) = password_hash {
                row.password_hash = hash.to_string();
            }
        }

        Ok(())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.probe.hit()?;
        let mut state = self.state.lock();
        let row = state
            .rows
            .get_mut(&id.into_inner())
            .ok_or(DomainError::UserNotFound(id))?;
        row.password_hash = password_hash.to_string();
        row.user.modified_at = modified_at;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> RepoResult<()> {
        self.probe.hit()?;
        self.state.lock().rows.remove(&id.into_inner());
        Ok(())
    }

    async fn delete_all(&self) -> RepoResult<()> {
        self.probe.hit()?;
        let mut state = self.state.lock();
        state.rows.clear();
        state.next_id = 1;
        Ok(())
    }
}

/// In-memory `WatchRepository` that joins names against an [`InMemoryUserRepository`]
#[derive(Debug, Clone)]
pub struct InMemoryWatchRepository {
    pairs: Arc<Mutex<BTreeSet<(i64, i64)>>>,
    users: InMemoryUserRepository,
    probe: Arc<Probe>,
}

impl InMemoryWatchRepository {
    pub fn new(users: &InMemoryUserRepository) -> Self {
        Self {
            pairs: Arc::default(),
            users: users.clone(),
            probe: Arc::default(),
        }
    }

    /// Number of storage calls made so far
    pub fn calls(&self) -> usize {
        self.probe.calls.load(Ordering::SeqCst)
    }

    /// Make every following storage call fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.probe.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored watch rows
    pub fn len(&self) -> usize {
        self.pairs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.lock().is_empty()
    }
}

#[async_trait]
impl WatchRepository for InMemoryWatchRepository {
    async fn find_watched_ids(&self, watcher: UserId) -> RepoResult<Vec<UserId>> {
        self.probe.hit()?;
        let w = watcher.into_inner();
        Ok(self
            .pairs
            .lock()
            .iter()
            .filter(|(uid, _)| *uid == w)
            .map(|(_, watched)| UserId::new(*watched))
            .collect())
    }

    async fn find_names(&self, user: UserId, direction: WatchDirection) -> RepoResult<Vec<String>> {
        self.probe.hit()?;
        let u = user.into_inner();
        let pairs: Vec<(i64, i64)> = self.pairs.lock().iter().copied().collect();

        let mut names: Vec<String> = pairs
            .into_iter()
            .filter_map(|(watcher, watched)| {
                // Both ends must exist, as with the SQL join
                let watcher_name = self.users.username_of(UserId::new(watcher))?;
                let watched_name = self.users.username_of(UserId::new(watched))?;
                match direction {
                    WatchDirection::Watching if watcher == u => Some(watched_name),
                    WatchDirection::WatchedBy if watched == u => Some(watcher_name),
                    _ => None,
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    async fn exists(&self, watcher: UserId, watched: UserId) -> RepoResult<bool> {
        self.probe.hit()?;
        Ok(self
            .pairs
            .lock()
            .contains(&(watcher.into_inner(), watched.into_inner())))
    }

    async fn toggle(&self, watcher: UserId, watched: UserId) -> RepoResult<bool> {
        self.probe.hit()?;
        let pair = (watcher.into_inner(), watched.into_inner());
        let mut pairs = self.pairs.lock();
        if pairs.remove(&pair) {
            Ok(false)
        } else {
            pairs.insert(pair);
            Ok(true)
        }
    }

    async fn delete_all(&self) -> RepoResult<()> {
        self.probe.hit()?;
        self.pairs.lock().clear();
        Ok(())
    }
}

/// Service context over fresh in-memory repositories, plus handles to them
pub fn in_memory_context(
    accounts: AccountConfig,
) -> (ServiceContext, InMemoryUserRepository, InMemoryWatchRepository) {
    let users = InMemoryUserRepository::new();
    let watches = InMemoryWatchRepository::new(&users);
    let ctx = ServiceContext::new(
        Arc::new(users.clone()),
        Arc::new(watches.clone()),
        Arc::new(accounts),
    );
    (ctx, users, watches)
}
