//! Session state in Redis.
//!
//! Each session is one hash at `<namespace>:session:<id>`. Every write
//! pushes the expiry forward, so an idle session disappears after its TTL.

use async_trait::async_trait;
use redis::AsyncCommands;
use scuttle_common::AccountConfig;
use scuttle_core::{DomainError, RepoResult, SessionStore};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::pool::{ttl_to_i64, RedisPool, RedisPoolError};

/// Key prefix for session hashes
pub const SESSION_PREFIX: &str = "session:";

/// Default idle lifetime of a session (1 day)
pub const DEFAULT_SESSION_TTL: u64 = 24 * 60 * 60;

/// Convert a Redis failure into the domain's session store error
pub fn map_cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

/// One client's session, backed by a Redis hash
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    session_id: String,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Attach to an existing session id
    #[must_use]
    pub fn new(pool: RedisPool, session_id: impl Into<String>) -> Self {
        Self::with_ttl(pool, session_id, DEFAULT_SESSION_TTL)
    }

    /// Attach to an existing session id with a custom TTL
    #[must_use]
    pub fn with_ttl(pool: RedisPool, session_id: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            pool,
            session_id: session_id.into(),
            ttl_seconds,
        }
    }

    /// Attach to a session id using the installation's session lifetime
    #[must_use]
    pub fn for_installation(
        pool: RedisPool,
        accounts: &AccountConfig,
        session_id: impl Into<String>,
    ) -> Self {
        Self::with_ttl(pool, session_id, accounts.session_ttl)
    }

    /// Start a fresh session with a random id
    #[must_use]
    pub fn start(pool: RedisPool) -> Self {
        Self::new(pool, Uuid::new_v4().simple().to_string())
    }

    /// Id to hand back to the client
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Redis key of the session hash
    fn key(&self) -> String {
        self.pool.key(&format!("{SESSION_PREFIX}{}", self.session_id))
    }

    /// Push the expiry forward without writing
    pub async fn touch(&self) -> RepoResult<bool> {
        self.pool
            .expire(&self.key(), self.ttl_seconds)
            .await
            .map_err(map_cache_error)
    }

    async fn connection(&self) -> RepoResult<deadpool_redis::Connection> {
        self.pool.connection().await.map_err(map_cache_error)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .hget(self.key(), key)
            .await
            .map_err(|e| map_cache_error(e.into()))?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(session = %self.session_id))]
    async fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let ttl = ttl_to_i64(self.ttl_seconds).map_err(map_cache_error)?;
        let hash = self.key();
        let mut conn = self.connection().await?;

        redis::pipe()
            .atomic()
            .hset(&hash, key, value)
            .ignore()
            .expire(&hash, ttl)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_cache_error(e.into()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn remove(&self, key: &str) -> RepoResult<()> {
        let mut conn = self.connection().await?;
        conn.hdel::<_, _, ()>(self.key(), key)
            .await
            .map_err(|e| map_cache_error(e.into()))?;
        Ok(())
    }

    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn clear(&self) -> RepoResult<()> {
        let existed = self
            .pool
            .delete(&self.key())
            .await
            .map_err(map_cache_error)?;
        debug!(existed, "Cleared session");
        Ok(())
    }
}
