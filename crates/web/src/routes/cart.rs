//! Cart and checkout route handlers.
//!
//! Both sit behind the any-role guard: the cart belongs to a signed-in
//! user. Checkout additionally requires a verified email.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};

use crate::guard::CurrentUser;
use crate::models::Profile;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub user: Profile,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub user: Profile,
}

/// Unverified-email interstitial shown instead of checkout.
#[derive(Template, WebTemplate)]
#[template(path = "verify_required.html")]
pub struct VerifyRequiredTemplate {
    pub user: Profile,
}

/// Display the cart page.
pub async fn show(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    CartTemplate { user }
}

/// Display the checkout page.
///
/// Users who have not verified their email get an interstitial pointing
/// them at the resend-verification action instead.
pub async fn checkout(CurrentUser(user): CurrentUser) -> Response {
    if user.verified {
        CheckoutTemplate { user }.into_response()
    } else {
        VerifyRequiredTemplate { user }.into_response()
    }
}
