//! Shared account route handlers, reachable by any authenticated role.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::guard::CurrentUser;
use crate::models::Profile;
use crate::session::SessionStore;
use crate::state::AppState;

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub user: Profile,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the profile page.
pub async fn profile(
    CurrentUser(user): CurrentUser,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ProfileTemplate {
        user,
        error: query.error,
        success: query.success,
    }
}

/// Ask the backend to send a fresh verification email.
///
/// Goes through the session store so the credential used is the one
/// hydration validated.
pub async fn resend_verification(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Response {
    if user.verified {
        return Redirect::to("/account/profile?success=already_verified").into_response();
    }

    let mut store = SessionStore::new(&session, state.api());
    store.hydrate().await;

    match store.resend_verification().await {
        Ok(_) => Redirect::to("/account/profile?success=verification_sent").into_response(),
        Err(failure) => {
            tracing::warn!("resend verification failed: {failure}");
            Redirect::to("/account/profile?error=verification_failed").into_response()
        }
    }
}
