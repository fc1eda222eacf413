//! Validated form input for registration, login and profile updates

pub mod requests;

pub use requests::{LoginRequest, RegisterRequest, UpdateUserRequest};
