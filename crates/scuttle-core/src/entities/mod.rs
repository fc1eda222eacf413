//! Domain entities - core business objects

mod user;
mod watch;

pub use user::{NewUser, User, UserChanges, UserRef};
pub use watch::WatchDirection;
