//! Home page and health check route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::OptionalUser;
use crate::models::Profile;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Cached profile for the header greeting; display only.
    pub user: Option<Profile>,
}

/// Display the home page.
pub async fn home(OptionalUser(user): OptionalUser) -> impl IntoResponse {
    HomeTemplate { user }
}

/// Health check endpoint for load balancers and uptime monitors.
pub async fn health() -> impl IntoResponse {
    "OK"
}
