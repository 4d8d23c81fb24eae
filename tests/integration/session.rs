use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use pretty_assertions::assert_eq;
use whareiq::{
    models::Credentials,
    route::Route,
    secret::Secret,
    session::{AuthError, SessionCache, SessionStore},
};

use crate::test_utils::{FakeIdentityProvider, SessionBuilder, TestDriver, TestEnvironment};

fn credentials(email: &str) -> Credentials {
    Credentials { email: email.to_string(), password: Secret::new("pw") }
}

/// Environment whose cache holds an expired session, already loaded.
fn with_expired_session() -> TestEnvironment {
    let env = TestEnvironment::new().unwrap();
    SessionCache::in_dir(env.data_dir.path()).store(Some(&SessionBuilder::new().expired().build())).unwrap();
    assert!(env.session.load().is_some());
    env
}

#[tokio::test]
async fn test_session_survives_restart() {
    let env = TestEnvironment::new().unwrap();
    env.session.sign_in(&credentials("carol@example.com")).await.unwrap();

    let restarted = SessionStore::new(env.provider.clone()).with_cache(SessionCache::in_dir(env.data_dir.path()));
    let restored = restarted.load().expect("cached session");
    assert_eq!(restored, FakeIdentityProvider::session_for("carol@example.com"));
    assert_eq!(restarted.get_session().await.session, Some(restored));
}

#[tokio::test]
async fn test_sign_out_forgets_cached_session() {
    let env = TestEnvironment::signed_in().await.unwrap();
    let cache = SessionCache::in_dir(env.data_dir.path());
    assert!(cache.load().is_some());

    env.session.sign_out().await;
    assert!(cache.load().is_none());
    assert!(!cache.path().exists());
}

#[tokio::test]
async fn test_repeated_reads_agree() {
    let env = TestEnvironment::signed_in().await.unwrap();
    let first = env.session.get_session().await;
    let second = env.session.get_session().await;
    assert_eq!(first.session, second.session);
    assert_eq!(env.provider.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transient_refresh_failure_keeps_stale_session() {
    let env = with_expired_session();

    let read = env.session.get_session().await;
    assert!(read.session.is_some());
    assert!(read.transient_error.is_some());
    assert_eq!(env.provider.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(SessionCache::in_dir(env.data_dir.path()).load().is_some());
}

#[tokio::test]
async fn test_rejected_refresh_signs_out_and_notifies() {
    let env = with_expired_session();
    env.provider.on_refresh(Err(AuthError::Rejected { status: 400, message: "Invalid Refresh Token".to_string() }));

    let notified = Arc::new(AtomicUsize::new(0));
    let seen = notified.clone();
    env.session.on_change(move |session| {
        assert!(session.is_none());
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let read = env.session.get_session().await;
    assert_eq!(read.session, None);
    assert_eq!(read.transient_error, None);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert!(SessionCache::in_dir(env.data_dir.path()).load().is_none());
}

#[tokio::test]
async fn test_refreshed_session_is_persisted() {
    let env = with_expired_session();
    env.provider.on_refresh(Ok(SessionBuilder::new().token("renewed").build()));

    let read = env.session.get_session().await;
    assert_eq!(read.session.map(|s| s.access_token), Some(Secret::new("renewed")));
    let cached = SessionCache::in_dir(env.data_dir.path()).load().unwrap();
    assert_eq!(cached.access_token.expose(), "renewed");
}

#[tokio::test]
async fn test_app_start_with_rejected_refresh_lands_on_landing() {
    let env = with_expired_session();
    env.provider.on_refresh(Err(AuthError::Rejected { status: 401, message: "expired".to_string() }));

    let driver = TestDriver::start(env, Route::ConnectDb).await.unwrap();
    assert_eq!(driver.route(), Route::Landing);
}

#[tokio::test]
async fn test_app_start_with_unreachable_provider_keeps_user_in() {
    let env = with_expired_session();

    let mut driver = TestDriver::start(env, Route::ConnectDb).await.unwrap();
    assert_eq!(driver.route(), Route::ConnectDb);
    assert!(driver.render().unwrap().iter().any(|line| line.contains("Connect your database")));
}
