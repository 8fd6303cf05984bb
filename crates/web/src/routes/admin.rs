//! Admin console route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::CurrentUser;
use crate::models::Profile;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub user: Profile,
}

/// Admin user management template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct AdminUsersTemplate {
    pub user: Profile,
}

/// Display the admin dashboard.
pub async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    AdminDashboardTemplate { user }
}

/// Display the user management page.
pub async fn users(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    AdminUsersTemplate { user }
}
