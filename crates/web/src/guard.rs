//! Route guard: per-navigation access control.
//!
//! Each protected route tree declares, at registration time, the set of roles
//! allowed to view it (a [`RouteRule`]). On every request the guard hydrates
//! the session store first and only then decides, so no access decision is
//! ever made from an unvalidated session. The decision itself is the pure
//! function [`decide`], kept free of HTTP so the whole state machine is
//! testable on its own.
//!
//! Denials are silent: an unauthenticated visitor is sent to the
//! login page with the requested location preserved, and an authenticated
//! user of the wrong role is sent to their own console's home rather than a
//! dead-end "forbidden" page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use bazaar_core::Role;

use crate::models::{Profile, session_keys};
use crate::session::{SessionStatus, SessionStore};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Rules & Decisions
// ─────────────────────────────────────────────────────────────────────────────

/// Authorization rule attached to a route at registration time.
///
/// An empty role set means the route is public. A non-empty set grants
/// access by plain membership; declaration order carries no precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    roles: &'static [Role],
}

impl RouteRule {
    /// Rule for routes reachable by anyone, authenticated or not.
    pub const PUBLIC: Self = Self { roles: &[] };

    /// Rule permitting exactly the given roles.
    #[must_use]
    pub const fn any_of(roles: &'static [Role]) -> Self {
        Self { roles }
    }

    /// Whether this route is reachable without authentication.
    #[must_use]
    pub const fn is_public(self) -> bool {
        self.roles.is_empty()
    }

    /// Set-containment check, nothing more.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Common rules, named after the console they gate.
pub mod rules {
    use bazaar_core::Role;

    use super::RouteRule;

    /// Admin console only.
    pub const ADMIN: RouteRule = RouteRule::any_of(&[Role::Admin]);
    /// Seller console only.
    pub const SELLER: RouteRule = RouteRule::any_of(&[Role::Seller]);
    /// Customer console only.
    pub const CUSTOMER: RouteRule = RouteRule::any_of(&[Role::Customer]);
    /// Any authenticated user (cart, checkout, shared profile page).
    pub const ANY_USER: RouteRule =
        RouteRule::any_of(&[Role::Customer, Role::Seller, Role::Admin]);
}

/// Outcome of an access decision for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Hydration has not settled; render a neutral loading state and decide
    /// nothing yet.
    Pending,
    /// Not authenticated on a protected route: go log in, then come back.
    RedirectToLogin {
        /// The originally requested location, carried through the login flow.
        next: String,
    },
    /// Authenticated but not permitted: go to this user's own console home.
    RedirectToRoleHome(Role),
    /// Render the requested view.
    Granted,
}

/// Decide whether a navigation may proceed.
///
/// Public routes are granted unconditionally, whatever the session status.
/// Protected routes defer while hydration is unsettled, bounce anonymous
/// visitors to login, and bounce wrong-role users to their own console.
#[must_use]
pub fn decide(
    status: SessionStatus,
    role: Option<Role>,
    rule: RouteRule,
    requested: &str,
) -> GuardDecision {
    if rule.is_public() {
        return GuardDecision::Granted;
    }

    match status {
        SessionStatus::Uninitialized | SessionStatus::Hydrating => GuardDecision::Pending,
        SessionStatus::Anonymous => GuardDecision::RedirectToLogin {
            next: requested.to_owned(),
        },
        SessionStatus::Authenticated => match role {
            Some(role) if rule.permits(role) => GuardDecision::Granted,
            Some(role) => GuardDecision::RedirectToRoleHome(role),
            // An authenticated session always carries a profile; a missing
            // role is a broken session, treated like no session at all.
            None => GuardDecision::RedirectToLogin {
                next: requested.to_owned(),
            },
        },
    }
}

/// The single role-to-landing-surface mapping.
///
/// Exhaustive over [`Role`]: adding a role will not compile until it gets a
/// home here.
#[must_use]
pub const fn role_home(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Seller => "/seller",
        Role::Customer => "/customer/dashboard",
    }
}

/// Login URL carrying the originally requested location.
#[must_use]
pub fn login_redirect(next: &str) -> String {
    format!("/login?next={}", urlencoding::encode(next))
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Neutral loading page shown while an access decision is deferred.
#[derive(Template, WebTemplate)]
#[template(path = "loading.html")]
struct LoadingTemplate;

/// Route-layer middleware enforcing the [`RouteRule`] attached to the tree.
///
/// Hydrates the session store before deciding, so the decision always runs
/// against a settled status. On grant, the validated [`Profile`] is inserted
/// into request extensions for handlers to extract via [`CurrentUser`].
pub async fn enforce(
    State(state): State<AppState>,
    Extension(rule): Extension<RouteRule>,
    session: Session,
    // Nesting strips the route prefix from `request.uri()`; the original
    // URI is what the user should come back to after logging in.
    OriginalUri(original_uri): OriginalUri,
    mut request: Request,
    next: Next,
) -> Response {
    if rule.is_public() {
        return next.run(request).await;
    }

    let mut store = SessionStore::new(&session, state.api());
    store.hydrate().await;

    let requested = original_uri
        .path_and_query()
        .map_or_else(|| original_uri.path().to_owned(), ToString::to_string);

    match decide(
        store.status(),
        store.profile().map(|p| p.role),
        rule,
        &requested,
    ) {
        GuardDecision::Granted => {
            if let Some(profile) = store.profile() {
                request.extensions_mut().insert(profile.clone());
            }
            next.run(request).await
        }
        GuardDecision::RedirectToLogin { next } => {
            Redirect::to(&login_redirect(&next)).into_response()
        }
        GuardDecision::RedirectToRoleHome(role) => Redirect::to(role_home(role)).into_response(),
        // Unreachable after hydrate(), which always settles; kept as a real
        // response so an unsettled status can never leak guarded content.
        GuardDecision::Pending => LoadingTemplate.into_response(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractors
// ─────────────────────────────────────────────────────────────────────────────

/// Extractor for the validated profile on a guarded route.
///
/// Only available behind [`enforce`]; using it on an unguarded route
/// redirects to login rather than panicking.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct CurrentUser(pub Profile);

/// Rejection when a validated profile is required but absent.
pub enum GuardRejection {
    /// Redirect to the login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Profile>().cloned().map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                GuardRejection::Unauthorized
            } else {
                GuardRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor for the cached profile, if any, without backend validation.
///
/// For display-only concerns on public pages (the header greeting, showing
/// a login vs. logout button). Never use this for an access decision: the
/// cached copy is identity, not trust.
pub struct OptionalUser(pub Option<Profile>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let profile = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<Profile>(session_keys::PROFILE)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(profile))
    }
}
