//! Session storage module.
//!
//! Redis-backed implementation of the `SessionStore` port.

mod redis_session;

pub use redis_session::{map_cache_error, RedisSessionStore, DEFAULT_SESSION_TTL, SESSION_PREFIX};
