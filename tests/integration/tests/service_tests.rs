//! Service Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance (DATABASE_URL)
//! - Running Redis instance for the session store tests (REDIS_URL)
//!
//! Run with: cargo test -p integration-tests --test service_tests

use integration_tests::{
    check_redis_env, check_test_env, redis_pool, redis_session, test_accounts, unique_username,
    TestAccount, TestClient, TestEnv,
};
use scuttle_cache::RedisSessionStore;
use scuttle_core::{UserChanges, UserId, WatchDirection};
use scuttle_service::dto::RegisterRequest;
use scuttle_service::{AuthService, ServiceError, UserService, WatchService};

// ============================================================================
// Account Tests
// ============================================================================

#[tokio::test]
async fn test_register_and_lookup() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let users = UserService::new(&env.ctx);
    let username = unique_username("reg");

    let request = RegisterRequest {
        username: username.clone(),
        email: format!("{username}@example.org"),
        password: "secret".to_string(),
        enable_private_key: true,
    };
    let id = users.register(request.clone()).await.unwrap();

    let by_id = users.get_user(id).await.unwrap().unwrap();
    let by_name = users.get_user_by_username(&username).await.unwrap().unwrap();
    assert_eq!(by_id, by_name);
    assert_eq!(users.resolve_user_id(&username).await.unwrap(), Some(id));
    assert!(by_id.has_active_private_key());

    let err = users.register(request).await.unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_register_rejects_reserved_name() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let request = RegisterRequest {
        username: "root".to_string(),
        email: "root@example.org".to_string(),
        password: "secret".to_string(),
        enable_private_key: false,
    };

    let err = UserService::new(&env.ctx)
        .register(request)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_update_and_reset_password() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let users = UserService::new(&env.ctx);
    let auth = AuthService::new(&env.ctx);
    let account = TestAccount::create(&env.ctx, "upd").await.unwrap();

    let changes = UserChanges {
        name: Some("Updated".to_string()),
        email: "updated@example.org".to_string(),
        homepage: None,
        content: Some("bio".to_string()),
        private_key: None,
        enable_private_key: false,
    };
    users.update_user(account.id, None, changes).await.unwrap();

    let user = users.get_user(account.id).await.unwrap().unwrap();
    assert_eq!(user.name.as_deref(), Some("Updated"));
    assert!(user.modified_at >= user.created_at);

    // Password untouched by the update
    let client = TestClient::new();
    let (mut session, _) = client.request().await.unwrap();
    auth.login(&mut session, &account.username, &account.password, false)
        .await
        .unwrap();

    let new_password = users.reset_password(account.id).await.unwrap().unwrap();
    let (mut session, _) = TestClient::new().request().await.unwrap();
    assert!(auth
        .login(&mut session, &account.username, &account.password, false)
        .await
        .unwrap_err()
        .is_auth_failure());
    auth.login(&mut session, &account.username, &new_password, false)
        .await
        .unwrap();

    let unknown = UserId::new(i64::MAX);
    assert!(users.reset_password(unknown).await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_checks() {
    if !check_test_env() {
        return;
    }

    let admin_name = unique_username("adm");
    let env = TestEnv::start_with_accounts(test_accounts(vec![
        admin_name.clone(),
        unique_username("gone"),
    ]))
    .await
    .expect("Failed to start test env");
    let users = UserService::new(&env.ctx);

    let admin = users
        .create_user(&admin_name, "pw", "a@example.org", None, false)
        .await
        .unwrap();
    let regular = TestAccount::create(&env.ctx, "reg").await.unwrap();

    assert!(users.is_admin_by_id(admin).await.unwrap());
    assert!(!users.is_admin_by_id(regular.id).await.unwrap());
    assert!(users.is_admin_by_username(&admin_name));
    let record = users.get_user(admin).await.unwrap().unwrap();
    assert!(users.is_admin_by_record(&record));
    assert_eq!(users.list_admin_ids().await.unwrap(), vec![admin]);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_session_and_cookie() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let auth = AuthService::new(&env.ctx);
    let account = TestAccount::create(&env.ctx, "login").await.unwrap();
    let mut client = TestClient::new();

    // First request logs in with remember-me
    let (mut session, jar) = client.request().await.unwrap();
    let id = auth
        .login(&mut session, &account.username, &account.password, true)
        .await
        .unwrap();
    assert_eq!(id, account.id);
    client.finish(&jar);
    assert_eq!(client.cookies.len(), 1);

    // Next request carries the session
    let (mut session, _) = client.request().await.unwrap();
    assert!(session.is_session_stable().await.unwrap());
    let user = auth.current_user(&mut session, false).await.unwrap().unwrap();
    assert_eq!(user.username, account.username);

    // After a browser restart the cookie alone restores the login
    let restarted = client.without_session();
    let (mut session, _) = restarted.request().await.unwrap();
    assert!(!session.is_session_stable().await.unwrap());
    assert_eq!(auth.current_user_id(&mut session).await.unwrap(), Some(id));

    // Logout drops both
    let (mut session, jar) = client.request().await.unwrap();
    auth.logout(&mut session).await.unwrap();
    client.finish(&jar);
    assert!(client.cookies.is_empty());
    let (mut session, _) = client.request().await.unwrap();
    assert!(!auth.is_logged_on(&mut session).await.unwrap());
}

#[tokio::test]
async fn test_login_by_private_key() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let auth = AuthService::new(&env.ctx);
    let users = UserService::new(&env.ctx);
    let account = TestAccount::create_with_key(&env.ctx, "pkey", true)
        .await
        .unwrap();
    let key = users
        .get_user(account.id)
        .await
        .unwrap()
        .unwrap()
        .private_key
        .unwrap();
    assert!(users.private_key_exists(&key).await.unwrap());

    let (mut session, jar) = TestClient::new().request().await.unwrap();
    let id = auth
        .login_by_private_key(&mut session, &account.username, &key)
        .await
        .unwrap();
    assert_eq!(id, account.id);
    assert!(jar.pending().is_empty());

    let (mut session, _) = TestClient::new().request().await.unwrap();
    let err = auth
        .login_by_private_key(&mut session, &account.username, "")
        .await
        .unwrap_err();
    assert!(err.is_auth_failure());
}

// ============================================================================
// Watch Tests
// ============================================================================

#[tokio::test]
async fn test_watch_toggle_and_names() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let auth = AuthService::new(&env.ctx);
    let watches = WatchService::new(&env.ctx);
    let watcher = TestAccount::create(&env.ctx, "wa").await.unwrap();
    let target = TestAccount::create(&env.ctx, "wb").await.unwrap();

    let (mut session, _) = TestClient::new().request().await.unwrap();
    auth.login(&mut session, &watcher.username, &watcher.password, false)
        .await
        .unwrap();

    assert!(watches.toggle_watch(&mut session, target.id).await.unwrap());
    assert!(watches.watch_status(target.id, watcher.id).await.unwrap());
    assert_eq!(watches.watch_list(watcher.id).await.unwrap(), vec![target.id]);
    assert_eq!(
        watches
            .watched_names(target.id, WatchDirection::WatchedBy)
            .await
            .unwrap(),
        vec![watcher.username.clone()]
    );

    assert!(!watches.toggle_watch(&mut session, target.id).await.unwrap());
    assert!(!watches.watch_status(target.id, watcher.id).await.unwrap());
}

#[tokio::test]
async fn test_anonymous_toggle_is_rejected() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let target = TestAccount::create(&env.ctx, "anon").await.unwrap();
    let (mut session, _) = TestClient::new().request().await.unwrap();

    let err = WatchService::new(&env.ctx)
        .toggle_watch(&mut session, target.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::App(_)));
    assert!(err.is_auth_failure());
}

#[tokio::test]
async fn test_delete_user_keeps_watch_rows() {
    if !check_test_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let auth = AuthService::new(&env.ctx);
    let users = UserService::new(&env.ctx);
    let watches = WatchService::new(&env.ctx);
    let watcher = TestAccount::create(&env.ctx, "dwa").await.unwrap();
    let target = TestAccount::create(&env.ctx, "dwb").await.unwrap();

    let (mut session, _) = TestClient::new().request().await.unwrap();
    auth.login(&mut session, &watcher.username, &watcher.password, false)
        .await
        .unwrap();
    watches.toggle_watch(&mut session, target.id).await.unwrap();

    users.delete_user(target.id).await.unwrap();
    assert!(!users.user_id_exists(target.id).await.unwrap());

    // The row stays, even though the name no longer resolves
    assert!(watches.watch_status(target.id, watcher.id).await.unwrap());
    assert!(watches
        .watched_names(watcher.id, WatchDirection::Watching)
        .await
        .unwrap()
        .is_empty());

    // Deleting again is a no-op
    users.delete_user(target.id).await.unwrap();
}

// ============================================================================
// Redis Session Tests
// ============================================================================

#[tokio::test]
async fn test_redis_session_carries_login() {
    if !check_redis_env() {
        return;
    }

    let env = TestEnv::start().await.expect("Failed to start test env");
    let auth = AuthService::new(&env.ctx);
    let account = TestAccount::create(&env.ctx, "redis").await.unwrap();
    let pool = redis_pool().expect("Failed to create Redis pool");
    pool.ping().await.expect("Redis is not reachable");
    let session_id = unique_username("sess");

    let mut first = redis_session(pool.clone(), env.ctx.accounts(), &session_id);
    first.update_session_stability().await.unwrap();
    assert!(!first.is_session_stable().await.unwrap());
    auth.login(&mut first, &account.username, &account.password, false)
        .await
        .unwrap();

    let mut second = redis_session(pool.clone(), env.ctx.accounts(), &session_id);
    second.update_session_stability().await.unwrap();
    assert!(second.is_session_stable().await.unwrap());
    assert_eq!(
        auth.current_user_id(&mut second).await.unwrap(),
        Some(account.id)
    );
    let store =
        RedisSessionStore::for_installation(pool.clone(), env.ctx.accounts(), &session_id);
    assert!(store.touch().await.unwrap());

    auth.logout(&mut second).await.unwrap();
    assert!(!store.touch().await.unwrap());
    let mut third = redis_session(pool, env.ctx.accounts(), &session_id);
    assert_eq!(auth.current_user_id(&mut third).await.unwrap(), None);
}
