//! User profile types.
//!
//! The profile is the backend's description of the authenticated user. It is
//! fetched from `GET /auth/me`, cached in the session alongside the bearer
//! token, and replaced wholesale on every refresh.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, Role, UserId};

/// The authenticated user's record, as returned by the backend.
///
/// Field names follow the backend's camelCase JSON. The `role` is fixed for
/// the lifetime of a session; a role change on the backend only becomes
/// visible after re-authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Backend user ID.
    pub user_id: UserId,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address.
    pub email: Email,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// The user's role. One role per user.
    pub role: Role,
    /// Whether the user has completed email verification.
    ///
    /// Verification gates certain mutating actions (checkout, reviews) but
    /// never route access.
    #[serde(rename = "isVerified", default)]
    pub verified: bool,
    /// Whether a seller account has been approved by an admin.
    #[serde(rename = "isSellerApproved")]
    pub seller_approved: Option<bool>,
    /// Seller store name, if any.
    pub store_name: Option<String>,
}

impl Profile {
    /// Display name for headers and greetings.
    ///
    /// Falls back to the email address when no name parts are set.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.email.to_string(),
        }
    }
}

/// Session keys for authentication data.
///
/// The two entries are always written together and cleared together; no
/// operation patches one without the other.
pub mod session_keys {
    /// Key for the bearer token issued by the backend.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Key for the cached profile of the logged-in user.
    pub const PROFILE: &str = "profile";
}
