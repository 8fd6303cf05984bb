//! Backend REST API client.
//!
//! The storefront frontend holds no data of its own; everything comes from
//! the backend's JSON API. This module wraps the handful of endpoints the
//! session core consumes. Every response uses the backend's envelope shape:
//!
//! ```json
//! { "success": true, "message": "...", "data": { ... } }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_web::services::api::ApiClient;
//!
//! let api = ApiClient::new(&config.backend);
//! let login = api.login("shopper@example.com", "secret").await?;
//! let profile = api.current_user(&login.token).await?;
//! ```

mod error;

pub use error::ApiError;

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use bazaar_core::AuthToken;

use crate::config::BackendConfig;
use crate::models::Profile;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// The backend's uniform response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

/// Successful login payload: a fresh bearer token plus the user it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    /// Bearer token for subsequent authenticated requests.
    pub token: AuthToken,
    /// Profile of the authenticated user.
    pub user: Profile,
}

/// Registration form data forwarded to the backend.
///
/// Validation beyond structural checks belongs to the backend; the frontend
/// only confirms the two password fields match before sending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Requested role, `CUSTOMER` or `SELLER`. Admin accounts are
    /// provisioned out of band.
    pub role: bazaar_core::Role,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new backend API client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the response envelope.
    ///
    /// A parseable envelope with `success: false` becomes [`ApiError::Rejected`]
    /// regardless of HTTP status; a body that is not an envelope becomes
    /// [`ApiError::Protocol`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) if envelope.success => Ok(envelope),
            Ok(envelope) => Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "Request rejected by the backend".to_owned()),
            )),
            Err(_) => Err(ApiError::Protocol(format!("HTTP {status} without envelope"))),
        }
    }

    /// Send a request whose envelope must carry data.
    async fn request_data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Protocol("missing data in successful response".to_owned()))
    }

    /// Send a request where only the human-readable message matters.
    async fn request_message(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let envelope = self.send::<serde_json::Value>(request).await?;
        Ok(envelope.message.unwrap_or_else(|| "OK".to_owned()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchange credentials for a bearer token and profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message for invalid
    /// credentials, or a transport/protocol error if the backend is
    /// unreachable or answers garbage.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        self.request_data(request).await
    }

    /// Create a new account.
    ///
    /// Deliberately does not return a token: registration never establishes
    /// a session, the user logs in explicitly afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for validation failures such as a
    /// duplicate email.
    pub async fn register(&self, form: &RegisterRequest) -> Result<Profile, ApiError> {
        let request = self.inner.client.post(self.url("/auth/register")).json(form);
        self.request_data(request).await
    }

    /// Fetch the profile belonging to a bearer token.
    ///
    /// This is the trust anchor for session hydration: a token the backend
    /// rejects here is dead, whatever the session says.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or the backend is
    /// unreachable. Callers treat any failure as an untrusted session.
    pub async fn current_user(&self, token: &AuthToken) -> Result<Profile, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token.as_str());
        self.request_data(request).await
    }

    /// Ask the backend to invalidate a token server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails. Callers ignore it: local session
    /// clearing is the authoritative part of logout.
    pub async fn logout(&self, token: &AuthToken) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token.as_str());
        self.request_message(request).await.map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Email Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Redeem an email verification token from a verification link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for expired or already-used tokens.
    pub async fn verify_email(&self, token: &str) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/auth/verify-email"))
            .query(&[("token", token)]);
        self.request_message(request).await
    }

    /// Request a fresh verification email for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the account is already verified or
    /// the backend rate-limits the resend.
    pub async fn resend_verification(&self, token: &AuthToken) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/resend-verification"))
            .bearer_auth(token.as_str());
        self.request_message(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Password Recovery
    // ─────────────────────────────────────────────────────────────────────────

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request. Callers show a
    /// uniform success message either way to avoid email enumeration.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/user/forgot-password"))
            .json(&ForgotPasswordRequest { email });
        self.request_message(request).await
    }

    /// Set a new password using a reset token from a recovery email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for invalid or expired reset tokens.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/user/reset-password"))
            .json(&ResetPasswordRequest {
                token,
                new_password,
            });
        self.request_message(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decodes_success_with_data() {
        let envelope: Envelope<LoginData> = serde_json::from_str(
            r#"{
                "success": true,
                "message": "Login successful",
                "data": {
                    "token": "tok-9",
                    "user": {"userId": 3, "email": "a@b.com", "role": "CUSTOMER", "isVerified": false}
                }
            }"#,
        )
        .unwrap();
        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data.token.as_str(), "tok-9");
        assert!(!data.user.verified);
    }

    #[test]
    fn test_envelope_decodes_failure_without_data() {
        let envelope: Envelope<LoginData> =
            serde_json::from_str(r#"{"success": false, "message": "Invalid email or password"}"#)
                .unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Invalid email or password"));
    }

    #[test]
    fn test_register_request_serializes_camel_case() {
        let form = RegisterRequest {
            first_name: "May".to_owned(),
            last_name: "Tran".to_owned(),
            email: "may@example.com".to_owned(),
            password: "pw".to_owned(),
            phone_number: None,
            address: None,
            role: bazaar_core::Role::Customer,
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["firstName"], "May");
        assert_eq!(json["role"], "CUSTOMER");
        assert!(json.get("phoneNumber").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new(&BackendConfig {
            base_url: "http://backend.test/api/".to_owned(),
        });
        assert_eq!(client.url("/auth/me"), "http://backend.test/api/auth/me");
    }
}
