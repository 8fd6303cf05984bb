//! Authentication route handlers.
//!
//! Handles login, registration, logout, email verification and the
//! password recovery flow against the commerce backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use bazaar_core::Role;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::guard::role_home;
use crate::services::api::RegisterRequest;
use crate::session::SessionStore;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Originally requested location, carried through the form.
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// Either `CUSTOMER` or `SELLER`; admin accounts are provisioned, not
    /// self-registered.
    pub role: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters carrying an emailed token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub next: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Registration success page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_success.html")]
pub struct RegisterSuccessTemplate {
    pub email: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
    pub token: String,
}

/// Email verification result template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_email.html")]
pub struct VerifyEmailTemplate {
    pub message: String,
    pub succeeded: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Keep a post-login destination only if it is a local path.
///
/// Anything that does not start with a single `/` could send the user off
/// the site (`https://...` or the scheme-relative `//evil.example`).
fn sanitize_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
        next: query.next,
    }
}

/// Handle login form submission.
///
/// On success the user lands on the location they were originally headed
/// to, falling back to their role's console home. On failure the login page
/// is re-rendered with the backend's message; any existing session is left
/// untouched.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut store = SessionStore::new(&session, state.api());

    match store.login(&form.email, &form.password).await {
        Ok(()) => {
            let Some(profile) = store.profile() else {
                return Redirect::to("/login").into_response();
            };

            set_sentry_user(&profile.user_id, Some(profile.email.as_str()));

            let destination = sanitize_next(form.next.as_deref())
                .map_or_else(|| role_home(profile.role).to_owned(), ToOwned::to_owned);
            Redirect::to(&destination).into_response()
        }
        Err(failure) => LoginTemplate {
            error: Some(failure.message),
            success: None,
            next: form.next,
        }
        .into_response(),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle registration form submission.
///
/// Creates the account on the backend but never logs the new user in; the
/// success page directs them to verify their email and sign in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return RegisterTemplate {
            error: Some("Passwords do not match".to_string()),
        }
        .into_response();
    }
    if form.password.len() < 8 {
        return RegisterTemplate {
            error: Some("Password must be at least 8 characters".to_string()),
        }
        .into_response();
    }

    let role = match form.role.parse::<Role>() {
        Ok(role @ (Role::Customer | Role::Seller)) => role,
        _ => {
            return RegisterTemplate {
                error: Some("Choose a customer or seller account".to_string()),
            }
            .into_response();
        }
    };

    let request = RegisterRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email.clone(),
        password: form.password,
        phone_number: form.phone_number.filter(|p| !p.is_empty()),
        address: form.address.filter(|a| !a.is_empty()),
        role,
    };

    let store = SessionStore::new(&session, state.api());
    match store.register(&request).await {
        Ok(profile) => RegisterSuccessTemplate {
            email: profile.email.to_string(),
        }
        .into_response(),
        Err(failure) => RegisterTemplate {
            error: Some(failure.message),
        }
        .into_response(),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// The local session is gone by the time this returns, whatever the
/// backend said about it.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let mut store = SessionStore::new(&session, state.api());
    store.logout().await;

    clear_sentry_user();

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Password Recovery Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle forgot password form submission.
///
/// Always reports success to avoid confirming which addresses have
/// accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    if let Err(e) = state.api().forgot_password(&form.email).await {
        tracing::warn!("Password recovery request failed: {}", e);
    }

    Redirect::to("/forgot-password?success=email_sent").into_response()
}

/// Display the reset password page.
///
/// Reached from the link in the recovery email; the token rides along in
/// the query string.
pub async fn reset_password_page(Query(query): Query<TokenQuery>) -> Response {
    match query.token {
        Some(token) => ResetPasswordTemplate {
            error: query.error,
            token,
        }
        .into_response(),
        None => Redirect::to("/forgot-password?error=invalid_reset_link").into_response(),
    }
}

/// Handle reset password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        return ResetPasswordTemplate {
            error: Some("Passwords do not match".to_string()),
            token: form.token,
        }
        .into_response();
    }

    match state.api().reset_password(&form.token, &form.password).await {
        Ok(_) => Redirect::to("/login?success=password_reset").into_response(),
        Err(e) => {
            tracing::warn!("Password reset failed: {}", e);
            ResetPasswordTemplate {
                error: Some(e.user_message()),
                token: form.token,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Email Verification Route
// =============================================================================

/// Handle the verification link from the signup email.
///
/// If the visitor is logged in, the session profile is re-hydrated after
/// verification so the verified flag is current immediately.
pub async fn verify_email(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<TokenQuery>,
) -> Result<Response, AppError> {
    // A link without a token is malformed, not a failed verification.
    let token = query
        .token
        .ok_or_else(|| AppError::BadRequest("Missing verification token".into()))?;

    let result = state.api().verify_email(&token).await;

    // Pick up the verified flag if this browser holds a session.
    let mut store = SessionStore::new(&session, state.api());
    store.hydrate().await;

    Ok(match result {
        Ok(message) => VerifyEmailTemplate {
            message,
            succeeded: true,
        }
        .into_response(),
        Err(e) => {
            tracing::warn!("Email verification failed: {}", e);
            VerifyEmailTemplate {
                message: e.user_message(),
                succeeded: false,
            }
            .into_response()
        }
    })
}
