//! Authentication service
//!
//! Resolves the current user from the session or the remember-me cookie,
//! and handles login and logout.

use scuttle_common::auth::{hash_password, LoginCookie};
use scuttle_core::{Cookie, User, UserId};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::LoginRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionContext;
use super::user::require_valid_id;

/// Path the remember-me cookie is scoped to
const COOKIE_PATH: &str = "/";

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Current user
    // ========================================================================

    /// Id of the logged-on user, resolved once per request.
    ///
    /// Looks at the session first, then at the remember-me cookie. A valid
    /// cookie is promoted into the session.
    pub async fn current_user_id(
        &self,
        session: &mut SessionContext,
    ) -> ServiceResult<Option<UserId>> {
        if let Some(id) = session.cached_id() {
            return Ok(id);
        }

        let id = self.resolve_current_user_id(session).await?;
        session.cache_id(id);
        Ok(id)
    }

    #[instrument(skip_all)]
    async fn resolve_current_user_id(
        &self,
        session: &SessionContext,
    ) -> ServiceResult<Option<UserId>> {
        let session_key = self.ctx.accounts().session_key();

        if let Some(raw) = session.store().get(&session_key).await? {
            match UserId::parse(&raw) {
                Ok(id) => return Ok(Some(id)),
                Err(e) => debug!(error = %e, "Ignoring malformed session user id"),
            }
        }

        let Some(raw) = session.cookies().get(&self.ctx.accounts().cookie_key()) else {
            return Ok(None);
        };
        let Some(cookie) = LoginCookie::parse(&raw) else {
            warn!("Ignoring malformed login cookie");
            return Ok(None);
        };

        let repo = self.ctx.user_repo();
        let Some(user) = repo.find_by_id(cookie.user_id).await? else {
            warn!(user_id = %cookie.user_id, "Login cookie for unknown user");
            return Ok(None);
        };
        let Some(stored_hash) = repo.get_password_hash(user.id).await? else {
            return Ok(None);
        };

        if !cookie.matches(&user.username, &stored_hash) {
            warn!(user_id = %user.id, "Login cookie hash mismatch");
            return Ok(None);
        }

        session
            .store()
            .set(&session_key, &user.id.to_string())
            .await?;
        debug!(user_id = %user.id, "Login cookie promoted into session");

        Ok(Some(user.id))
    }

    /// Full record of the logged-on user; `refresh` reloads it from storage
    pub async fn current_user(
        &self,
        session: &mut SessionContext,
        refresh: bool,
    ) -> ServiceResult<Option<User>> {
        if !refresh {
            if let Some(user) = session.cached_user() {
                return Ok(user.clone());
            }
        }

        let user = match self.current_user_id(session).await? {
            Some(id) => self.ctx.user_repo().find_by_id(id).await?,
            None => None,
        };
        session.cache_user(user.clone());
        Ok(user)
    }

    /// Bind the session to a user, or unbind it with `None`
    #[instrument(skip(self, session))]
    pub async fn set_current_user_id(
        &self,
        session: &mut SessionContext,
        id: Option<UserId>,
    ) -> ServiceResult<()> {
        let session_key = self.ctx.accounts().session_key();
        match id {
            Some(id) => {
                require_valid_id(id)?;
                session.store().set(&session_key, &id.to_string()).await?;
            }
            None => session.store().remove(&session_key).await?,
        }
        session.invalidate();
        Ok(())
    }

    pub async fn is_logged_on(&self, session: &mut SessionContext) -> ServiceResult<bool> {
        Ok(self.current_user_id(session).await?.is_some())
    }

    // ========================================================================
    // Login / logout
    // ========================================================================

    /// Log in with username and password.
    ///
    /// With `remember` the long-lived login cookie is issued as well. An
    /// unknown user and a wrong password fail the same way.
    #[instrument(skip(self, session, password))]
    pub async fn login(
        &self,
        session: &mut SessionContext,
        username: &str,
        password: &str,
        remember: bool,
    ) -> ServiceResult<UserId> {
        let password_hash = hash_password(password);
        let id = self
            .ctx
            .user_repo()
            .find_id_by_credentials(username, &password_hash)
            .await?
            .ok_or_else(|| {
                warn!(username = %username, "Login failed");
                ServiceError::invalid_credentials()
            })?;

        self.set_current_user_id(session, Some(id)).await?;

        if remember {
            let accounts = self.ctx.accounts();
            let cookie = LoginCookie::issue(id, username, &password_hash);
            session.cookies_mut().set(Cookie::new(
                accounts.cookie_key(),
                cookie.to_string(),
                accounts.cookie_lifetime,
                COOKIE_PATH,
            ));
        }

        info!(user_id = %id, remember, "User logged in");
        Ok(id)
    }

    /// Validate a login form and log in
    pub async fn login_with(
        &self,
        session: &mut SessionContext,
        request: LoginRequest,
    ) -> ServiceResult<UserId> {
        request.validate()?;
        self.login(session, &request.username, &request.password, request.remember)
            .await
    }

    /// Log in with username and private key; never issues a cookie
    #[instrument(skip(self, session, private_key))]
    pub async fn login_by_private_key(
        &self,
        session: &mut SessionContext,
        username: &str,
        private_key: &str,
    ) -> ServiceResult<UserId> {
        if private_key.is_empty() {
            warn!(username = %username, "Private key login without a key");
            return Err(ServiceError::invalid_credentials());
        }

        let id = self
            .ctx
            .user_repo()
            .find_id_by_private_key(username, private_key)
            .await?
            .ok_or_else(|| {
                warn!(username = %username, "Private key login failed");
                ServiceError::invalid_credentials()
            })?;

        self.set_current_user_id(session, Some(id)).await?;
        info!(user_id = %id, "User logged in with private key");
        Ok(id)
    }

    /// Drop the login cookie and every session value
    #[instrument(skip_all)]
    pub async fn logout(&self, session: &mut SessionContext) -> ServiceResult<()> {
        session
            .cookies_mut()
            .remove(&self.ctx.accounts().cookie_key(), COOKIE_PATH);
        session.store().clear().await?;

        session.cache_id(None);
        session.cache_user(None);

        info!("User logged out");
        Ok(())
    }
}
