//! Shared test harness: a stand-in commerce backend plus app construction.
//!
//! The stand-in backend is a real axum server on an ephemeral port speaking
//! the backend's envelope protocol, so the client under test exercises its
//! full HTTP path.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use bazaar_web::config::BazaarConfig;
use bazaar_web::state::AppState;

/// Shared state of the stand-in backend.
#[derive(Default)]
pub struct BackendState {
    /// token -> user object returned by `/auth/me`
    users: Mutex<HashMap<String, Value>>,
    /// email -> (password, token)
    credentials: Mutex<HashMap<String, (String, String)>>,
    /// Tokens the backend no longer accepts.
    revoked: Mutex<HashSet<String>>,
    logout_calls: AtomicUsize,
    fail_logout: AtomicBool,
}

/// Handle to the running stand-in backend.
pub struct FakeBackend {
    pub addr: SocketAddr,
    state: Arc<BackendState>,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Start the backend on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/auth/logout", post(logout))
            .route("/auth/verify-email", get(verify_email))
            .route("/auth/resend-verification", post(resend_verification))
            .route("/user/forgot-password", post(forgot_password))
            .route("/user/reset-password", post(reset_password))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stand-in backend");
        let addr = listener.local_addr().expect("stand-in backend addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stand-in backend");
        });

        Self { addr, state }
    }

    /// Base URL for pointing the client under test at this backend.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register a user the backend will vouch for.
    ///
    /// Returns the user object served by `/auth/me`.
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        token: &str,
        role: &str,
        verified: bool,
    ) -> Value {
        let user = user_json(email, role, verified);
        self.state
            .users
            .lock()
            .expect("users lock")
            .insert(token.to_string(), user.clone());
        self.state
            .credentials
            .lock()
            .expect("credentials lock")
            .insert(
                email.to_string(),
                (password.to_string(), token.to_string()),
            );
        user
    }

    /// Make the backend reject a previously valid token.
    pub fn revoke(&self, token: &str) {
        self.state
            .revoked
            .lock()
            .expect("revoked lock")
            .insert(token.to_string());
    }

    /// Number of `/auth/logout` calls received.
    pub fn logout_calls(&self) -> usize {
        self.state.logout_calls.load(Ordering::SeqCst)
    }

    /// Make `/auth/logout` answer with a plain HTTP 500.
    pub fn fail_logout(&self) {
        self.state.fail_logout.store(true, Ordering::SeqCst);
    }
}

/// A user object in the backend's wire shape.
pub fn user_json(email: &str, role: &str, verified: bool) -> Value {
    json!({
        "userId": 41,
        "firstName": "Test",
        "lastName": "User",
        "email": email,
        "phoneNumber": null,
        "address": null,
        "role": role,
        "isVerified": verified,
        "isSellerApproved": null,
        "storeName": null,
    })
}

fn envelope(success: bool, message: &str, data: Value) -> Value {
    json!({ "success": success, "message": message, "data": data })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let credentials = state.credentials.lock().expect("credentials lock");
    if let Some((expected, token)) = credentials.get(&email)
        && expected == password
    {
        let user = state.users.lock().expect("users lock")[token].clone();
        return Json(envelope(
            true,
            "Login successful",
            json!({ "token": token, "user": user }),
        ))
        .into_response();
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(envelope(false, "Invalid email or password", Value::Null)),
    )
        .into_response()
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    let email = body["email"].as_str().unwrap_or_default();
    if email.ends_with("@taken.example") {
        return (
            StatusCode::CONFLICT,
            Json(envelope(false, "Email already registered", Value::Null)),
        )
            .into_response();
    }

    let role = body["role"].as_str().unwrap_or("CUSTOMER");
    Json(envelope(
        true,
        "Registration successful",
        user_json(email, role, false),
    ))
    .into_response()
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> impl IntoResponse {
    let token = bearer_token(&headers).unwrap_or_default();

    let revoked = state.revoked.lock().expect("revoked lock").contains(&token);
    let user = state.users.lock().expect("users lock").get(&token).cloned();

    match user {
        Some(user) if !revoked => {
            Json(envelope(true, "Authenticated", user)).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(envelope(false, "Invalid or expired token", Value::Null)),
        )
            .into_response(),
    }
}

async fn logout(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> impl IntoResponse {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);

    if state.fail_logout.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if let Some(token) = bearer_token(&headers) {
        state.revoked.lock().expect("revoked lock").insert(token);
    }
    Json(envelope(true, "Logged out", Value::Null)).into_response()
}

async fn verify_email(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("token").map(String::as_str) {
        Some("good-verify-token") => {
            Json(envelope(true, "Email verified successfully", Value::Null)).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(envelope(false, "Invalid verification token", Value::Null)),
        )
            .into_response(),
    }
}

async fn resend_verification(headers: HeaderMap) -> impl IntoResponse {
    if bearer_token(&headers).is_some() {
        Json(envelope(true, "Verification email sent", Value::Null)).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(envelope(false, "Not authenticated", Value::Null)),
        )
            .into_response()
    }
}

async fn forgot_password(Json(_body): Json<Value>) -> impl IntoResponse {
    Json(envelope(true, "Recovery email sent", Value::Null))
}

async fn reset_password(Json(body): Json<Value>) -> impl IntoResponse {
    match body["token"].as_str() {
        Some("good-reset-token") => {
            Json(envelope(true, "Password reset successfully", Value::Null)).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(envelope(false, "Invalid reset token", Value::Null)),
        )
            .into_response(),
    }
}

/// Build the application under test, pointed at the stand-in backend.
#[allow(dead_code)]
pub fn test_app(backend: &FakeBackend) -> Router {
    let config = BazaarConfig::test_default(backend.base_url());
    bazaar_web::app(AppState::new(config))
}

/// Extract the session cookie pair from a response, if one was set.
#[allow(dead_code)]
pub fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
