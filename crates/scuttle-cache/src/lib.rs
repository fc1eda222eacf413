//! # scuttle-cache
//!
//! Redis layer for per-client session state.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Session Storage**: `SessionStore` implementation keeping each session in one Redis hash
//!
//! ## Example
//!
//! ```ignore
//! use scuttle_cache::{RedisPool, RedisPoolConfig, RedisSessionStore};
//!
//! let pool = RedisPool::from_config(&app_config)?;
//!
//! // Resume the session named by the client's session cookie, or start one
//! let store = match session_cookie {
//!     Some(id) => RedisSessionStore::new(pool, id),
//!     None => RedisSessionStore::start(pool),
//! };
//! ```

pub mod pool;
pub mod session;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, DEFAULT_NAMESPACE};

// Re-export session types
pub use session::{map_cache_error, RedisSessionStore, DEFAULT_SESSION_TTL, SESSION_PREFIX};
