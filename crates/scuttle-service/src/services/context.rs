//! Service context - dependency container for services
//!
//! Holds the repositories and account settings shared by every request.

use std::sync::Arc;

use scuttle_common::AccountConfig;
use scuttle_core::traits::{UserRepository, WatchRepository};
use scuttle_db::{PgPool, PgUserRepository, PgWatchRepository, Schema};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    watch_repo: Arc<dyn WatchRepository>,

    // Settings
    accounts: Arc<AccountConfig>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        watch_repo: Arc<dyn WatchRepository>,
        accounts: Arc<AccountConfig>,
    ) -> Self {
        Self {
            user_repo,
            watch_repo,
            accounts,
        }
    }

    /// Context over PostgreSQL, with both repositories sharing one schema
    pub fn postgres(pool: PgPool, accounts: AccountConfig) -> Self {
        let schema = Schema::shared(&accounts.table_prefix);
        Self::new(
            Arc::new(PgUserRepository::with_schema(pool.clone(), schema.clone())),
            Arc::new(PgWatchRepository::with_schema(pool, schema)),
            Arc::new(accounts),
        )
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the watch repository
    pub fn watch_repo(&self) -> &dyn WatchRepository {
        self.watch_repo.as_ref()
    }

    // === Settings ===

    /// Get the account settings
    pub fn accounts(&self) -> &AccountConfig {
        &self.accounts
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("accounts", &self.accounts)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    watch_repo: Option<Arc<dyn WatchRepository>>,
    accounts: Option<AccountConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn watch_repo(mut self, repo: Arc<dyn WatchRepository>) -> Self {
        self.watch_repo = Some(repo);
        self
    }

    pub fn accounts(mut self, accounts: AccountConfig) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Build the ServiceContext; account settings fall back to their defaults
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.watch_repo
                .ok_or_else(|| ServiceError::validation("watch_repo is required"))?,
            Arc::new(self.accounts.unwrap_or_default()),
        ))
    }
}
