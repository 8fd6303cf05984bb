//! Customer console route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::CurrentUser;
use crate::models::Profile;

/// Customer dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/dashboard.html")]
pub struct CustomerDashboardTemplate {
    pub user: Profile,
}

/// Display the customer dashboard.
pub async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    CustomerDashboardTemplate { user }
}
