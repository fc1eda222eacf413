//! Watch service
//!
//! Who follows whom.

use scuttle_core::{UserId, WatchDirection};
use tracing::{info, instrument};

use super::auth::AuthService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionContext;
use super::user::require_valid_id;

/// Watch service
pub struct WatchService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> WatchService<'a> {
    /// Create a new WatchService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ids of the users `watcher` follows
    #[instrument(skip(self))]
    pub async fn watch_list(&self, watcher: UserId) -> ServiceResult<Vec<UserId>> {
        if !watcher.is_valid() {
            return Ok(Vec::new());
        }
        Ok(self.ctx.watch_repo().find_watched_ids(watcher).await?)
    }

    /// Usernames on one side of `user`'s watch list, sorted
    #[instrument(skip(self))]
    pub async fn watched_names(
        &self,
        user: UserId,
        direction: WatchDirection,
    ) -> ServiceResult<Vec<String>> {
        if !user.is_valid() {
            return Ok(Vec::new());
        }
        Ok(self.ctx.watch_repo().find_names(user, direction).await?)
    }

    /// Whether `watcher` follows `watched`
    #[instrument(skip(self))]
    pub async fn watch_status(&self, watched: UserId, watcher: UserId) -> ServiceResult<bool> {
        if !watched.is_valid() || !watcher.is_valid() {
            return Ok(false);
        }
        Ok(self.ctx.watch_repo().exists(watcher, watched).await?)
    }

    /// Follow `target` as the logged-on user, or stop following.
    ///
    /// Returns whether the user watches `target` afterwards.
    #[instrument(skip(self, session))]
    pub async fn toggle_watch(
        &self,
        session: &mut SessionContext,
        target: UserId,
    ) -> ServiceResult<bool> {
        require_valid_id(target)?;

        let watcher = AuthService::new(self.ctx)
            .current_user_id(session)
            .await?
            .ok_or_else(ServiceError::missing_auth)?;

        let watching = self.ctx.watch_repo().toggle(watcher, target).await?;
        info!(watcher = %watcher, target = %target, watching, "Watch toggled");
        Ok(watching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scuttle_common::AccountConfig;
    use scuttle_core::SessionStore;

    use crate::memory::{MemoryCookieJar, MemorySessionStore};
    use crate::services::UserService;
    use crate::testing::{in_memory_context, InMemoryWatchRepository};

    async fn setup() -> (ServiceContext, InMemoryWatchRepository, UserId, UserId, UserId) {
        let (ctx, _, watches) = in_memory_context(AccountConfig::default());
        let users = UserService::new(&ctx);
        let mut ids = Vec::new();
        for name in ["alice", "bobby", "carol"] {
            ids.push(
                users
                    .create_user(name, "pw", "u@example.org", None, false)
                    .await
                    .unwrap(),
            );
        }
        (ctx, watches, ids[0], ids[1], ids[2])
    }

    async fn session_for(ctx: &ServiceContext, id: UserId) -> SessionContext {
        let store = MemorySessionStore::new();
        store
            .set(&ctx.accounts().session_key(), &id.to_string())
            .await
            .unwrap();
        SessionContext::new(store, MemoryCookieJar::new())
    }

    #[tokio::test]
    async fn test_toggle_is_a_true_toggle() {
        let (ctx, _, alice, bobby, _) = setup().await;
        let service = WatchService::new(&ctx);
        let mut session = session_for(&ctx, alice).await;

        assert!(!service.watch_status(bobby, alice).await.unwrap());
        assert!(service.toggle_watch(&mut session, bobby).await.unwrap());
        assert!(service.watch_status(bobby, alice).await.unwrap());
        assert!(!service.watch_status(alice, bobby).await.unwrap());

        assert!(!service.toggle_watch(&mut session, bobby).await.unwrap());
        assert!(!service.watch_status(bobby, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_watch_lists_and_names() {
        let (ctx, _, alice, bobby, carol) = setup().await;
        let service = WatchService::new(&ctx);

        let mut as_alice = session_for(&ctx, alice).await;
        service.toggle_watch(&mut as_alice, carol).await.unwrap();
        service.toggle_watch(&mut as_alice, bobby).await.unwrap();
        let mut as_carol = session_for(&ctx, carol).await;
        service.toggle_watch(&mut as_carol, bobby).await.unwrap();

        let mut list = service.watch_list(alice).await.unwrap();
        list.sort();
        assert_eq!(list, vec![bobby, carol]);

        assert_eq!(
            service
                .watched_names(alice, WatchDirection::Watching)
                .await
                .unwrap(),
            vec!["bobby", "carol"]
        );
        assert_eq!(
            service
                .watched_names(bobby, WatchDirection::WatchedBy)
                .await
                .unwrap(),
            vec!["alice", "carol"]
        );
        assert!(service
            .watched_names(bobby, WatchDirection::Watching)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_toggle_requires_login() {
        let (ctx, watches, _, bobby, _) = setup().await;
        let service = WatchService::new(&ctx);
        let mut anonymous = SessionContext::new(MemorySessionStore::new(), MemoryCookieJar::new());

        let err = service
            .toggle_watch(&mut anonymous, bobby)
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());
        assert!(watches.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_ids() {
        let (ctx, watches, alice, _, _) = setup().await;
        let service = WatchService::new(&ctx);
        let mut session = session_for(&ctx, alice).await;

        let err = service
            .toggle_watch(&mut session, UserId::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert!(service.watch_list(UserId::new(-1)).await.unwrap().is_empty());
        assert!(!service
            .watch_status(UserId::new(0), alice)
            .await
            .unwrap());
        assert_eq!(watches.calls(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (ctx, watches, alice, bobby, _) = setup().await;
        let service = WatchService::new(&ctx);
        let mut session = session_for(&ctx, alice).await;
        watches.set_failing(true);

        let err = service.toggle_watch(&mut session, bobby).await.unwrap_err();
        assert!(err.is_storage_failure());
    }
}
