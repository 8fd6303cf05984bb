//! Seller console route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::CurrentUser;
use crate::models::Profile;

/// Seller dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "seller/dashboard.html")]
pub struct SellerDashboardTemplate {
    pub user: Profile,
    /// Whether the marketplace has approved this seller's store.
    pub approved: bool,
}

/// Display the seller dashboard.
///
/// Unapproved sellers see a pending banner rather than being locked out;
/// approval gates selling, not signing in.
pub async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let approved = user.seller_approved.unwrap_or(false);
    SellerDashboardTemplate { user, approved }
}
