//! Ports implemented by the infrastructure crates

mod repositories;
mod session;

pub use repositories::{RepoResult, UserRepository, WatchRepository};
pub use session::{Cookie, CookieJar, SessionStore};
