//! User service
//!
//! Account lookups, creation, profile updates, private keys, and role checks.

use chrono::Utc;
use scuttle_common::auth::{generate_password, generate_private_key_candidate, hash_password};
use scuttle_core::{DomainError, Field, NewUser, User, UserChanges, UserId, UserRef};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{RegisterRequest, UpdateUserRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Upper bound on private key candidates tried before giving up
pub const MAX_PRIVATE_KEY_ATTEMPTS: usize = 16;

/// Reject ids that cannot belong to a stored user
pub(crate) fn require_valid_id(id: UserId) -> ServiceResult<()> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(ServiceError::validation(format!("Invalid user id: {id}")))
    }
}

/// Zero means no limit
fn limit_arg(limit: usize) -> Option<i64> {
    if limit == 0 {
        None
    } else {
        Some(i64::try_from(limit).unwrap_or(i64::MAX))
    }
}

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get user by ID; ids that cannot exist are not looked up
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        if !id.is_valid() {
            return Ok(None);
        }
        Ok(self.ctx.user_repo().find_by_id(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.ctx.user_repo().find_by_username(username).await?)
    }

    /// Get the user holding a private key; the empty key matches nobody
    #[instrument(skip_all)]
    pub async fn get_user_by_private_key(&self, private_key: &str) -> ServiceResult<Option<User>> {
        if private_key.is_empty() {
            return Ok(None);
        }
        Ok(self.ctx.user_repo().find_by_private_key(private_key).await?)
    }

    /// Users ordered by id, newest first; `limit` 0 returns everyone
    #[instrument(skip(self))]
    pub async fn list_users(&self, limit: usize) -> ServiceResult<Vec<User>> {
        Ok(self.ctx.user_repo().list(limit_arg(limit)).await?)
    }

    /// Same ordering as [`Self::list_users`], id and username only
    pub async fn list_user_refs(&self, limit: usize) -> ServiceResult<Vec<UserRef>> {
        let users = self.list_users(limit).await?;
        Ok(users.iter().map(User::to_ref).collect())
    }

    pub async fn user_ref_by_username(&self, username: &str) -> ServiceResult<Option<UserRef>> {
        let user = self.get_user_by_username(username).await?;
        Ok(user.as_ref().map(User::to_ref))
    }

    /// Id of the account with this username
    pub async fn resolve_user_id(&self, username: &str) -> ServiceResult<Option<UserId>> {
        let user = self.get_user_by_username(username).await?;
        Ok(user.map(|u| u.id))
    }

    pub async fn user_exists(&self, username: &str) -> ServiceResult<bool> {
        Ok(self.get_user_by_username(username).await?.is_some())
    }

    pub async fn user_id_exists(&self, id: UserId) -> ServiceResult<bool> {
        Ok(self.get_user(id).await?.is_some())
    }

    // ========================================================================
    // Account mutation
    // ========================================================================

    /// Insert a new account and return its id.
    ///
    /// Performs no validation; callers run the validators first. When the
    /// private key is enabled and none is supplied, a fresh one is issued.
    #[instrument(skip(self, password, private_key))]
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        private_key: Option<String>,
        enable_private_key: bool,
    ) -> ServiceResult<UserId> {
        let mut private_key = private_key.filter(|k| !k.is_empty());
        if enable_private_key && private_key.is_none() {
            private_key = Some(self.generate_new_private_key().await?);
        }

        let new_user = NewUser::new(
            username.to_string(),
            hash_password(password),
            email.to_string(),
        )
        .with_private_key(private_key, enable_private_key);

        let id = self.ctx.user_repo().create(&new_user).await?;
        info!(user_id = %id, username = %username, "User created");

        Ok(id)
    }

    /// Validate a registration form and create the account
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserId> {
        request.validate()?;

        if self.is_reserved_username(&request.username) {
            return Err(DomainError::ReservedUsername(request.username).into());
        }
        if self.user_exists(&request.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        self.create_user(
            &request.username,
            &request.password,
            &request.email,
            None,
            request.enable_private_key,
        )
        .await
    }

    /// Overwrite a user's profile.
    ///
    /// A password that is absent or blank after trimming leaves the stored
    /// hash alone. Every other column takes the value in `changes`.
    #[instrument(skip(self, password, changes))]
    pub async fn update_user(
        &self,
        id: UserId,
        password: Option<&str>,
        changes: UserChanges,
    ) -> ServiceResult<()> {
        require_valid_id(id)?;

        let password_hash = password
            .filter(|p| !p.trim().is_empty())
            .map(hash_password);

        self.ctx
            .user_repo()
            .update(id, &changes, password_hash.as_deref(), Utc::now())
            .await?;

        info!(
            user_id = %id,
            password_changed = password_hash.is_some(),
            "User profile updated"
        );
        Ok(())
    }

    /// Validate a profile form and apply it
    #[instrument(skip(self, request))]
    pub async fn update_from_request(
        &self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> ServiceResult<()> {
        require_valid_id(id)?;
        request.validate()?;

        let password = request.new_password().map(str::to_owned);
        let changes = UserChanges {
            name: request.name,
            email: request.email,
            homepage: request.homepage,
            content: request.content,
            private_key: request.private_key,
            enable_private_key: request.enable_private_key,
        };

        self.update_user(id, password.as_deref(), changes).await
    }

    /// Replace the password with a random one and return it.
    ///
    /// `None` when no such user exists.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, id: UserId) -> ServiceResult<Option<String>> {
        require_valid_id(id)?;

        let password = generate_password();
        match self
            .ctx
            .user_repo()
            .update_password(id, &hash_password(&password), Utc::now())
            .await
        {
            Ok(()) => {
                info!(user_id = %id, "Password reset");
                Ok(Some(password))
            }
            Err(DomainError::UserNotFound(_)) => {
                debug!(user_id = %id, "Password reset for unknown user");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an account; its watch rows stay behind
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        require_valid_id(id)?;
        self.ctx.user_repo().delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Clear every account and watch row. Failures are logged, not returned.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) {
        if let Err(e) = self.ctx.user_repo().delete_all().await {
            warn!(error = %e, "Failed to clear users");
        }
        if let Err(e) = self.ctx.watch_repo().delete_all().await {
            warn!(error = %e, "Failed to clear watch list");
        }
        info!("All accounts cleared");
    }

    // ========================================================================
    // Private keys
    // ========================================================================

    /// Issue a private key no stored account holds yet
    #[instrument(skip(self))]
    pub async fn generate_new_private_key(&self) -> ServiceResult<String> {
        for attempt in 1..=MAX_PRIVATE_KEY_ATTEMPTS {
            let candidate = generate_private_key_candidate();
            if !self.private_key_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!(attempt, "Private key candidate already taken");
        }

        warn!(
            attempts = MAX_PRIVATE_KEY_ATTEMPTS,
            "Could not find an unused private key"
        );
        Err(DomainError::DatabaseError(format!(
            "no unused private key after {MAX_PRIVATE_KEY_ATTEMPTS} attempts"
        ))
        .into())
    }

    /// Check whether any account holds `private_key`; the empty key never does
    #[instrument(skip_all)]
    pub async fn private_key_exists(&self, private_key: &str) -> ServiceResult<bool> {
        if private_key.is_empty() {
            return Ok(false);
        }
        Ok(self.ctx.user_repo().private_key_exists(private_key).await?)
    }

    // ========================================================================
    // Field mapping
    // ========================================================================

    /// Physical column behind a logical field
    pub fn field_name(&self, field: Field) -> String {
        self.ctx.user_repo().field_map().get(field).to_string()
    }

    /// Point a logical field at another column; not validated
    pub fn set_field_name(&self, field: Field, column: impl Into<String>) {
        self.ctx.user_repo().set_field_name(field, column.into());
    }

    // ========================================================================
    // Validation and roles
    // ========================================================================

    pub fn is_valid_username(username: &str) -> bool {
        scuttle_core::is_valid_username(username)
    }

    pub fn is_valid_email(email: &str) -> bool {
        scuttle_core::is_valid_email(email)
    }

    pub fn is_reserved_username(&self, username: &str) -> bool {
        self.ctx.accounts().is_reserved(username)
    }

    pub fn is_admin_by_username(&self, username: &str) -> bool {
        self.ctx.accounts().is_admin(username)
    }

    pub fn is_admin_by_record(&self, user: &User) -> bool {
        self.is_admin_by_username(&user.username)
    }

    /// Admin check for an id; unknown users are not admins
    #[instrument(skip(self))]
    pub async fn is_admin_by_id(&self, id: UserId) -> ServiceResult<bool> {
        let user = self.get_user(id).await?;
        Ok(user.is_some_and(|u| self.is_admin_by_record(&u)))
    }

    /// Ids of the configured admins that have accounts
    #[instrument(skip(self))]
    pub async fn list_admin_ids(&self) -> ServiceResult<Vec<UserId>> {
        let mut ids = Vec::with_capacity(self.ctx.accounts().admin_users.len());
        for username in &self.ctx.accounts().admin_users {
            match self.resolve_user_id(username).await? {
                Some(id) => ids.push(id),
                None => debug!(username = %username, "Configured admin has no account"),
            }
        }
        Ok(ids)
    }
}
