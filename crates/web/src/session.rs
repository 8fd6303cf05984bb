//! Session store: single source of truth for "who is the current user, and
//! can we trust it".
//!
//! The store owns two pieces of session state, always written and cleared as
//! a pair: the bearer token issued by the backend and the cached profile it
//! belongs to. On every request the store is rebuilt from the persisted
//! session and, when a route needs an access decision, hydrated: the token is
//! replayed against `GET /auth/me` so trust always comes from the backend,
//! never from the cache alone.
//!
//! Expected failures (wrong password, duplicate email) are returned as
//! [`AuthFailure`] values; only infrastructure-level surprises surface as
//! errors. A token the backend rejects silently demotes the session to
//! [`SessionStatus::Anonymous`] and wipes the persisted pair, so a hydrate
//! after a rejection behaves exactly like starting with no stored token.

use tower_sessions::Session;

use bazaar_core::{AuthToken, Role};

use crate::models::{Profile, session_keys};
use crate::services::api::{ApiClient, RegisterRequest};

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Not yet hydrated; nothing is known about the visitor.
    Uninitialized,
    /// A stored token exists and is being validated against the backend.
    Hydrating,
    /// Token and profile are present and the backend has confirmed them.
    Authenticated,
    /// No token, or the token was proven invalid.
    Anonymous,
}

impl SessionStatus {
    /// Whether hydration has run to completion.
    ///
    /// Access decisions must never be finalized before this is true.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Authenticated | Self::Anonymous)
    }
}

/// A routine, user-visible authentication failure.
///
/// Carries the message shown inline on the login or registration form.
/// Session state is left untouched when one of these is returned.
#[derive(Debug, Clone)]
pub struct AuthFailure {
    /// Human-readable reason, safe to render.
    pub message: String,
}

impl AuthFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Per-request session store.
///
/// Built from the request's [`Session`] (persistence surface) and the shared
/// [`ApiClient`] (backend surface). Views and guards go through this type;
/// nothing else reads or writes the session's auth keys.
pub struct SessionStore<'a> {
    session: &'a Session,
    api: &'a ApiClient,
    status: SessionStatus,
    token: Option<AuthToken>,
    profile: Option<Profile>,
}

impl<'a> SessionStore<'a> {
    /// Create an unhydrated store for the current request.
    #[must_use]
    pub const fn new(session: &'a Session, api: &'a ApiClient) -> Self {
        Self {
            session,
            api,
            status: SessionStatus::Uninitialized,
            token: None,
            profile: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Reconstruct session state from persisted storage and validate it.
    ///
    /// No stored token means the visitor is anonymous, full stop. A stored
    /// token is only trusted after the backend vouches for it; any failure
    /// (network, 401, malformed response) clears both persisted entries and
    /// demotes to anonymous. Malformed persisted data is treated as absent.
    ///
    /// Always settles: the returned status is `Authenticated` or `Anonymous`.
    pub async fn hydrate(&mut self) -> SessionStatus {
        let stored: Option<AuthToken> = self
            .session
            .get(session_keys::AUTH_TOKEN)
            .await
            .ok()
            .flatten();

        let Some(token) = stored else {
            // A malformed token entry or an orphaned profile entry must not
            // outlive hydration; both keys are cleared together.
            self.clear().await;
            return self.status;
        };

        self.status = SessionStatus::Hydrating;
        self.token = Some(token.clone());

        match self.api.current_user(&token).await {
            Ok(profile) => self.establish(token, profile).await,
            Err(err) => {
                tracing::info!("stored credential rejected, clearing session: {err}");
                self.clear().await;
            }
        }

        self.status
    }

    /// Authenticate with the backend and establish a session.
    ///
    /// On success the token and profile are set together and persisted
    /// together. On failure the existing session, if any, is left exactly as
    /// it was: a failed login is not a logout.
    ///
    /// # Errors
    ///
    /// Returns the user-facing reason as an [`AuthFailure`]; invalid
    /// credentials are an expected outcome, not an exception.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthFailure> {
        match self.api.login(email, password).await {
            Ok(data) => {
                self.establish(data.token, data.user).await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("login failed: {err}");
                Err(AuthFailure::new(err.user_message()))
            }
        }
    }

    /// Forward registration data to the backend.
    ///
    /// Never establishes a session, regardless of outcome: the user logs in
    /// explicitly afterwards.
    ///
    /// # Errors
    ///
    /// Returns the backend's validation message (duplicate email, weak
    /// password) as an [`AuthFailure`].
    pub async fn register(&self, form: &RegisterRequest) -> Result<Profile, AuthFailure> {
        match self.api.register(form).await {
            Ok(profile) => Ok(profile),
            Err(err) => {
                tracing::warn!("registration failed: {err}");
                Err(AuthFailure::new(err.user_message()))
            }
        }
    }

    /// Ask the backend to email a fresh verification link.
    ///
    /// Uses the credential hydration validated, never a raw persisted value.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] when no session is established or the
    /// backend declines.
    pub async fn resend_verification(&self) -> Result<String, AuthFailure> {
        let Some(token) = self.token.as_ref() else {
            return Err(AuthFailure::new("You need to sign in first."));
        };

        match self.api.resend_verification(token).await {
            Ok(message) => Ok(message),
            Err(err) => {
                tracing::warn!("resend verification failed: {err}");
                Err(AuthFailure::new(err.user_message()))
            }
        }
    }

    /// End the session.
    ///
    /// Notifies the backend on a best-effort basis, then unconditionally
    /// clears local and persisted state. An unreachable backend never leaves
    /// a stale local session behind.
    pub async fn logout(&mut self) {
        let token = match self.token.clone() {
            Some(token) => Some(token),
            None => self
                .session
                .get(session_keys::AUTH_TOKEN)
                .await
                .ok()
                .flatten(),
        };

        if let Some(token) = token
            && let Err(err) = self.api.logout(&token).await
        {
            tracing::warn!("backend logout failed, clearing local session anyway: {err}");
        }

        self.clear().await;
    }

    /// Re-fetch the profile using the held token.
    ///
    /// No-op when no token is held. A rejected token demotes to anonymous
    /// exactly like hydration. If the session was cleared while the request
    /// was in flight (a logout racing a refresh), the late response is
    /// discarded rather than resurrecting the profile.
    pub async fn refresh_profile(&mut self) -> SessionStatus {
        let Some(token) = self.token.clone() else {
            return self.status;
        };

        match self.api.current_user(&token).await {
            Ok(profile) => {
                // Logout wins: apply only if this store still holds the
                // credential the response was fetched with.
                if self.status == SessionStatus::Anonymous || self.token.as_ref() != Some(&token) {
                    return self.status;
                }
                self.establish(token, profile).await;
            }
            Err(err) => {
                tracing::info!("profile refresh rejected, clearing session: {err}");
                self.clear().await;
            }
        }

        self.status
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Predicates
    // ─────────────────────────────────────────────────────────────────────────

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// The validated profile. Present exactly when the status is
    /// [`SessionStatus::Authenticated`].
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// The held bearer token, for authenticated pass-through calls.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Whether both token and profile are present and validated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
            && self.token.is_some()
            && self.profile.is_some()
    }

    /// Whether the user is authenticated and has completed email
    /// verification.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.is_authenticated() && self.profile.as_ref().is_some_and(|p| p.verified)
    }

    /// Whether the user is authenticated and holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.is_authenticated() && self.profile.as_ref().is_some_and(|p| p.role == role)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Set token and profile together, in memory and in the session.
    ///
    /// Both persisted entries are full replacements; no partial-field writes.
    /// Persistence failures are logged, not surfaced: the in-memory session
    /// stays coherent for this request and the next request re-hydrates.
    async fn establish(&mut self, token: AuthToken, profile: Profile) {
        if let Err(err) = self.session.insert(session_keys::AUTH_TOKEN, &token).await {
            tracing::error!("failed to persist session token: {err}");
        }
        if let Err(err) = self.session.insert(session_keys::PROFILE, &profile).await {
            tracing::error!("failed to persist session profile: {err}");
        }

        self.token = Some(token);
        self.profile = Some(profile);
        self.status = SessionStatus::Authenticated;
    }

    /// Clear token and profile together, in memory and in the session.
    async fn clear(&mut self) {
        if let Err(err) = self
            .session
            .remove::<AuthToken>(session_keys::AUTH_TOKEN)
            .await
        {
            tracing::error!("failed to clear session token: {err}");
        }
        if let Err(err) = self.session.remove::<Profile>(session_keys::PROFILE).await {
            tracing::error!("failed to clear session profile: {err}");
        }

        self.token = None;
        self.profile = None;
        self.status = SessionStatus::Anonymous;
    }
}
