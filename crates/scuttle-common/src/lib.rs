//! # scuttle-common
//!
//! Shared utilities including configuration, error handling, credential
//! hashing, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    generate_password, generate_private_key_candidate, hash_password, login_cookie_hash,
    verify_password, LoginCookie, GENERATED_PASSWORD_LEN,
};
pub use config::{
    AccountConfig, AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, RedisConfig,
};
pub use error::{AppError, AppResult, ErrorKind, ErrorResponse};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    LogFormat, TracingConfig, TracingError,
};
