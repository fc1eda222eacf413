//! Integration test utilities for the account service
//!
//! This crate provides helpers for running end-to-end tests against
//! PostgreSQL and, when available, Redis.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
