//! Test helpers for integration tests
//!
//! Provides a migrated database, a service context over it, and fresh
//! per-request session contexts.

use anyhow::Result;
use scuttle_cache::{RedisPool, RedisPoolConfig, RedisSessionStore};
use scuttle_common::{try_init_tracing_with_config, AccountConfig, TracingConfig};
use scuttle_db::{create_pool, run_migrations, DatabaseConfig, PgPool};
use scuttle_service::{MemoryCookieJar, MemorySessionStore, ServiceContext, SessionContext};

/// Installation id used by every integration test
pub const TEST_INSTALLATION_ID: &str = "itest";

/// Helper to check if the database is available
pub fn check_test_env() -> bool {
    dotenvy::dotenv().ok();
    // Only the first test to get here installs the subscriber
    try_init_tracing_with_config(TracingConfig::development()).ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Helper to check if Redis is available as well
pub fn check_redis_env() -> bool {
    if !check_test_env() {
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Account settings with the given admins
pub fn test_accounts(admin_users: Vec<String>) -> AccountConfig {
    AccountConfig {
        installation_id: TEST_INSTALLATION_ID.to_string(),
        admin_users,
        reserved_users: vec!["admin".to_string(), "root".to_string()],
        ..Default::default()
    }
}

/// Migrated database plus a service context over it
pub struct TestEnv {
    pub pool: PgPool,
    pub ctx: ServiceContext,
}

impl TestEnv {
    /// Connect, migrate, and build a context with no admins
    pub async fn start() -> Result<Self> {
        Self::start_with_accounts(test_accounts(Vec::new())).await
    }

    /// Connect, migrate, and build a context with custom account settings
    pub async fn start_with_accounts(accounts: AccountConfig) -> Result<Self> {
        let pool = create_pool(&DatabaseConfig::from_env()).await?;
        run_migrations(&pool).await?;

        let ctx = ServiceContext::postgres(pool.clone(), accounts);
        Ok(Self { pool, ctx })
    }
}

/// Client state that survives between requests: the session and the cookies
/// the browser would send back
#[derive(Debug, Clone, Default)]
pub struct TestClient {
    pub store: MemorySessionStore,
    pub cookies: Vec<(String, String)>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same cookies, brand new session, like a browser restart
    pub fn without_session(&self) -> Self {
        Self {
            store: MemorySessionStore::new(),
            cookies: self.cookies.clone(),
        }
    }

    /// Open the session context for one request
    pub async fn request(&self) -> Result<(SessionContext, MemoryCookieJar)> {
        let jar = MemoryCookieJar::with_cookies(self.cookies.clone());
        let session = SessionContext::open(self.store.clone(), jar.clone()).await?;
        Ok((session, jar))
    }

    /// Apply the cookie changes a response carried
    pub fn finish(&mut self, jar: &MemoryCookieJar) {
        for cookie in jar.take_pending() {
            self.cookies.retain(|(name, _)| name != &cookie.name);
            if !cookie.is_removal() {
                self.cookies.push((cookie.name, cookie.value));
            }
        }
    }
}

/// Redis pool from `REDIS_URL`
pub fn redis_pool() -> Result<RedisPool> {
    let url = std::env::var("REDIS_URL")?;
    Ok(RedisPool::new(RedisPoolConfig {
        url,
        ..Default::default()
    })?)
}

/// Session context over a Redis-backed session
pub fn redis_session(
    pool: RedisPool,
    accounts: &AccountConfig,
    session_id: &str,
) -> SessionContext {
    SessionContext::new(
        RedisSessionStore::for_installation(pool, accounts, session_id),
        MemoryCookieJar::new(),
    )
}
