//! Test fixtures and data generators
//!
//! Provides reusable test accounts for integration tests.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use chrono::Utc;
use scuttle_core::UserId;
use scuttle_service::{ServiceContext, UserService};

/// Counter for unique test data
static COUNTER: AtomicU32 = AtomicU32::new(1);

/// Username unique across tests and runs, within the 24 character limit
pub fn unique_username(tag: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let stamp = Utc::now().timestamp_micros() % 1_000_000_000;
    format!("{tag}{stamp}_{n}")
}

/// Account created through the service, with its plaintext password
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

impl TestAccount {
    /// Create an account without a private key
    pub async fn create(ctx: &ServiceContext, tag: &str) -> Result<Self> {
        Self::create_with_key(ctx, tag, false).await
    }

    /// Create an account, optionally issuing a private key
    pub async fn create_with_key(
        ctx: &ServiceContext,
        tag: &str,
        enable_private_key: bool,
    ) -> Result<Self> {
        let username = unique_username(tag);
        let password = format!("pw-{username}");
        let id = UserService::new(ctx)
            .create_user(
                &username,
                &password,
                &format!("{username}@example.org"),
                None,
                enable_private_key,
            )
            .await?;

        Ok(Self {
            id,
            username,
            password,
        })
    }
}
