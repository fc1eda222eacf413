//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in scuttle-core.

mod error;
mod user;
mod watch;

pub use error::{map_db_error, map_unique_violation};
pub use user::PgUserRepository;
pub use watch::PgWatchRepository;
