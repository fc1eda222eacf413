//! Configuration structs

mod app_config;

pub use app_config::{
    AccountConfig, AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, RedisConfig,
};
