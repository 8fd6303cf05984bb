//! Session store behavior against a live stand-in backend.
//!
//! These tests build a bare `Session` over an in-memory store and drive the
//! store's lifecycle directly, without going through HTTP routing.

use std::sync::Arc;

use tower_sessions::{MemoryStore, Session};

use bazaar_core::Role;
use bazaar_web::config::BackendConfig;
use bazaar_web::models::session_keys;
use bazaar_web::services::api::{ApiClient, RegisterRequest};
use bazaar_web::session::{SessionStatus, SessionStore};

mod common;

use common::FakeBackend;

fn api_for(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(&BackendConfig {
        base_url: backend.base_url(),
    })
}

fn fresh_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

#[tokio::test]
async fn test_hydrate_without_token_is_anonymous() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    assert_eq!(store.status(), SessionStatus::Uninitialized);

    let status = store.hydrate().await;
    assert_eq!(status, SessionStatus::Anonymous);
    assert!(!store.is_authenticated());
    assert!(store.profile().is_none());
}

#[tokio::test]
async fn test_login_persists_token_and_profile_together() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");

    assert!(store.is_authenticated());
    assert!(store.is_verified());
    assert!(store.has_role(Role::Customer));
    assert!(!store.has_role(Role::Admin));

    // Both keys persisted, not just one.
    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert_eq!(token.map(bazaar_core::AuthToken::into_inner), Some("tok-9".to_string()));
    let profile: Option<bazaar_web::models::Profile> =
        session.get(session_keys::PROFILE).await.unwrap();
    assert_eq!(profile.unwrap().role, Role::Customer);
}

#[tokio::test]
async fn test_failed_login_leaves_existing_session_alone() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("first login should succeed");

    let failure = store
        .login("buyer@bazaar.test", "wrong")
        .await
        .expect_err("second login should fail");
    assert_eq!(failure.message, "Invalid email or password");

    // Still signed in as before.
    assert!(store.is_authenticated());
    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert!(token.is_some());
}

#[tokio::test]
async fn test_hydrate_revalidates_stored_token() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("seller@bazaar.test", "hunter22", "tok-s", "SELLER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    {
        let mut store = SessionStore::new(&session, &api);
        store
            .login("seller@bazaar.test", "hunter22")
            .await
            .expect("login should succeed");
    }

    // A new request builds a fresh store over the same session.
    let mut store = SessionStore::new(&session, &api);
    let status = store.hydrate().await;
    assert_eq!(status, SessionStatus::Authenticated);
    assert!(store.has_role(Role::Seller));
}

#[tokio::test]
async fn test_rejected_token_clears_both_keys_idempotently() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-123", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    {
        let mut store = SessionStore::new(&session, &api);
        store
            .login("buyer@bazaar.test", "hunter22")
            .await
            .expect("login should succeed");
    }

    backend.revoke("tok-123");

    let mut store = SessionStore::new(&session, &api);
    assert_eq!(store.hydrate().await, SessionStatus::Anonymous);

    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert!(token.is_none());
    let profile: Option<bazaar_web::models::Profile> =
        session.get(session_keys::PROFILE).await.unwrap();
    assert!(profile.is_none());

    // Hydrating again behaves exactly like never having had a token.
    let mut store = SessionStore::new(&session, &api);
    assert_eq!(store.hydrate().await, SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_register_does_not_authenticate() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    let store = SessionStore::new(&session, &api);
    let profile = store
        .register(&RegisterRequest {
            first_name: "New".to_string(),
            last_name: "Seller".to_string(),
            email: "new@bazaar.test".to_string(),
            password: "hunter22x".to_string(),
            phone_number: None,
            address: None,
            role: Role::Seller,
        })
        .await
        .expect("registration should succeed");

    assert_eq!(profile.role, Role::Seller);
    assert!(!profile.verified);

    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert!(token.is_none(), "registration must not persist a token");
}

#[tokio::test]
async fn test_register_duplicate_email_reports_backend_message() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    let store = SessionStore::new(&session, &api);
    let failure = store
        .register(&RegisterRequest {
            first_name: "Dupe".to_string(),
            last_name: "User".to_string(),
            email: "dupe@taken.example".to_string(),
            password: "hunter22x".to_string(),
            phone_number: None,
            address: None,
            role: Role::Customer,
        })
        .await
        .expect_err("duplicate email should be rejected");

    assert_eq!(failure.message, "Email already registered");
}

#[tokio::test]
async fn test_logout_notifies_backend_and_clears() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");

    store.logout().await;

    assert_eq!(backend.logout_calls(), 1);
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert!(store.token().is_none());
    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert!(token.is_none());
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");

    backend.fail_logout();
    store.logout().await;

    assert_eq!(backend.logout_calls(), 1);
    assert_eq!(store.status(), SessionStatus::Anonymous);
    let token: Option<bazaar_core::AuthToken> =
        session.get(session_keys::AUTH_TOKEN).await.unwrap();
    assert!(token.is_none(), "local state clears regardless of the backend");
}

#[tokio::test]
async fn test_refresh_profile_without_token_is_a_noop() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store.hydrate().await;

    let status = store.refresh_profile().await;
    assert_eq!(status, SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_refresh_profile_picks_up_backend_changes() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", false);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");
    assert!(!store.is_verified());

    // The user verifies their email out of band.
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);

    let status = store.refresh_profile().await;
    assert_eq!(status, SessionStatus::Authenticated);
    assert!(store.is_verified());
}

#[tokio::test]
async fn test_refresh_profile_rejection_demotes_to_anonymous() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("buyer@bazaar.test", "hunter22", "tok-9", "CUSTOMER", true);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("buyer@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");

    backend.revoke("tok-9");

    let status = store.refresh_profile().await;
    assert_eq!(status, SessionStatus::Anonymous);
    assert!(store.profile().is_none());
}

#[tokio::test]
async fn test_hydrate_clears_orphaned_profile_entry() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    // A cached profile with no token alongside it must not survive
    // hydration, or public pages would keep greeting a logged-out user.
    let profile: bazaar_web::models::Profile =
        serde_json::from_value(common::user_json("ghost@bazaar.test", "CUSTOMER", true))
            .expect("profile from wire json");
    session
        .insert(session_keys::PROFILE, &profile)
        .await
        .expect("seed profile entry");

    let mut store = SessionStore::new(&session, &api);
    assert_eq!(store.hydrate().await, SessionStatus::Anonymous);

    let cached: Option<bazaar_web::models::Profile> =
        session.get(session_keys::PROFILE).await.expect("read profile entry");
    assert!(cached.is_none());
}

#[tokio::test]
async fn test_hydrate_clears_malformed_token_entry() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    session
        .insert(session_keys::AUTH_TOKEN, &42)
        .await
        .expect("seed malformed token entry");

    let mut store = SessionStore::new(&session, &api);
    assert_eq!(store.hydrate().await, SessionStatus::Anonymous);

    let leftover: Option<serde_json::Value> =
        session.get(session_keys::AUTH_TOKEN).await.expect("read token entry");
    assert!(leftover.is_none());
}

#[tokio::test]
async fn test_resend_verification_uses_hydrated_credential() {
    let backend = FakeBackend::spawn().await;
    backend.add_user("new@bazaar.test", "hunter22", "tok-31", "CUSTOMER", false);
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store
        .login("new@bazaar.test", "hunter22")
        .await
        .expect("login should succeed");

    // A later request rebuilds the store from storage before resending.
    let mut later = SessionStore::new(&session, &api);
    later.hydrate().await;
    let message = later
        .resend_verification()
        .await
        .expect("resend should succeed");
    assert_eq!(message, "Verification email sent");
}

#[tokio::test]
async fn test_resend_verification_requires_a_session() {
    let backend = FakeBackend::spawn().await;
    let api = api_for(&backend);
    let session = fresh_session();

    let mut store = SessionStore::new(&session, &api);
    store.hydrate().await;
    assert!(store.resend_verification().await.is_err());
}
