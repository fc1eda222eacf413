//! # scuttle-db
//!
//! Database layer implementing the account repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `scuttle-core`. It handles:
//!
//! - Connection pool management and migrations
//! - Table naming and the logical to physical column mapping
//! - Database models with SQLx `FromRow` derives
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scuttle_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository, Schema};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!
//!     let schema = Schema::shared("");
//!     let user_repo = PgUserRepository::with_schema(pool, schema);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgUserRepository, PgWatchRepository};
pub use schema::{quote_ident, Schema};
