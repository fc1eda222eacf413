//! # scuttle-service
//!
//! Application layer: account management, login sessions, and watch lists.
//!
//! Services borrow a shared [`ServiceContext`]; anything tied to one client
//! (session values, cookies, the resolved current user) lives in a
//! [`SessionContext`] the caller creates per request.

pub mod dto;
pub mod memory;
pub mod services;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use memory::{MemoryCookieJar, MemorySessionStore};
pub use services::{
    AuthService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SessionContext, UserService, WatchService, MAX_PRIVATE_KEY_ATTEMPTS, SESSION_STABLE_KEY,
};
