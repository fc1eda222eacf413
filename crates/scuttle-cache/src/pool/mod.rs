//! Redis connection pool

mod redis_pool;

pub(crate) use redis_pool::ttl_to_i64;
pub use redis_pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, DEFAULT_NAMESPACE};
