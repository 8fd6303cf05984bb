//! HTTP route handlers for the web frontend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Auth (rate limited)
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /register                - Register page
//! POST /register                - Register action
//! POST /logout                  - Logout action
//! GET  /forgot-password         - Forgot password page
//! POST /forgot-password         - Request recovery email
//! GET  /reset-password          - Reset password page (token in query)
//! POST /reset-password          - Reset password action
//! GET  /verify-email            - Email verification callback (token in query)
//!
//! # Customer console (CUSTOMER role)
//! GET  /customer/dashboard      - Customer dashboard
//!
//! # Seller console (SELLER role)
//! GET  /seller                  - Seller dashboard
//!
//! # Admin console (ADMIN role)
//! GET  /admin                   - Admin dashboard
//! GET  /admin/users             - User management
//!
//! # Shared authenticated surfaces (any role)
//! GET  /account/profile         - Profile page
//! POST /account/resend-verification - Resend verification email
//! GET  /cart                    - Cart page
//! GET  /checkout                - Checkout (verified users only)
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod customer;
pub mod home;
pub mod seller;

use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};

use crate::guard::{self, RouteRule, rules};
use crate::state::AppState;

/// Attach a [`RouteRule`] to a router and enforce it on every request.
fn guarded(router: Router<AppState>, rule: RouteRule, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::enforce,
        ))
        .route_layer(Extension(rule))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/verify-email", get(auth::verify_email))
}

/// Create the customer console router.
pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(customer::dashboard))
}

/// Create the seller console router.
pub fn seller_routes() -> Router<AppState> {
    Router::new().route("/", get(seller::dashboard))
}

/// Create the admin console router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/users", get(admin::users))
}

/// Create the shared authenticated account router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route(
            "/resend-verification",
            post(account::resend_verification),
        )
}

/// Create all routes for the frontend.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Public pages
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .merge(auth_routes().route_layer(crate::middleware::auth_rate_limiter()))
        // Role-gated consoles
        .nest(
            "/customer",
            guarded(customer_routes(), rules::CUSTOMER, state),
        )
        .nest("/seller", guarded(seller_routes(), rules::SELLER, state))
        .nest("/admin", guarded(admin_routes(), rules::ADMIN, state))
        // Shared authenticated surfaces
        .nest(
            "/account",
            guarded(account_routes(), rules::ANY_USER, state),
        )
        .merge(guarded(
            Router::new()
                .route("/cart", get(cart::show))
                .route("/checkout", get(cart::checkout)),
            rules::ANY_USER,
            state,
        ))
}
