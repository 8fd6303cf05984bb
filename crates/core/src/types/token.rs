//! Bearer credential type.

use serde::{Deserialize, Serialize};

/// An opaque bearer token issued by the backend at login.
///
/// The token proves identity on authenticated requests; the frontend never
/// inspects its contents. Validity is established reactively: the backend
/// rejects a stale token on the next `GET /auth/me`, there is no client-side
/// expiry tracking.
///
/// `Debug` is implemented manually so tokens never leak into logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for use in an `Authorization: Bearer` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the raw token.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}
