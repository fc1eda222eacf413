//! Pooled Redis connections for session storage.
//!
//! Every key goes through [`RedisPool::key`], which puts the installation's
//! namespace in front so several sites can share one Redis server.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "scuttle";

/// Settings for the Redis pool
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Server URL, e.g. `redis://localhost:6379`
    pub url: String,
    /// Upper bound on open connections
    pub max_connections: usize,
    /// Prefix for every key, usually the installation id
    pub namespace: String,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RedisPoolConfig {
    /// Pool settings for an installation
    pub fn for_installation(config: &scuttle_common::AppConfig) -> Self {
        Self {
            url: config.redis.url.clone(),
            max_connections: config.redis.max_connections as usize,
            namespace: config.accounts.installation_id.clone(),
        }
    }
}

/// Errors from the Redis pool and the commands run through it
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("No Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Expiry of {0} seconds is out of range")]
    InvalidTtl(u64),
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Namespaced pool of Redis connections; clones share the pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    namespace: String,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("namespace", &self.namespace)
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. No connection is opened until first use.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        // Log only the host part; the URL may carry a password
        let host = config.url.rsplit('@').next().unwrap_or_default();
        tracing::info!(
            host = %host,
            namespace = %config.namespace,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self {
            pool,
            namespace: config.namespace,
        })
    }

    /// Build the pool for an installation's settings
    pub fn from_config(config: &scuttle_common::AppConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::for_installation(config))
    }

    /// Full Redis key for a key inside this pool's namespace
    pub fn key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.namespace)
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check out a connection
    pub async fn connection(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Round trip to the server
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Delete a full key; true when something was removed
    pub async fn delete(&self, full_key: &str) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let removed: u32 = conn.del(full_key).await?;
        Ok(removed > 0)
    }

    /// Reset a full key's expiry; false when the key does not exist
    pub async fn expire(&self, full_key: &str, ttl_seconds: u64) -> RedisResult<bool> {
        let ttl = ttl_to_i64(ttl_seconds)?;
        let mut conn = self.connection().await?;
        Ok(conn.expire(full_key, ttl).await?)
    }
}

/// Redis takes signed expiry seconds
pub(crate) fn ttl_to_i64(ttl_seconds: u64) -> RedisResult<i64> {
    i64::try_from(ttl_seconds).map_err(|_| RedisPoolError::InvalidTtl(ttl_seconds))
}
