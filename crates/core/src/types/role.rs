//! User roles.
//!
//! A user holds exactly one role for the lifetime of a session; changing
//! roles requires re-authentication. The backend serializes roles in
//! SCREAMING_SNAKE_CASE (`CUSTOMER`, `SELLER`, `ADMIN`).

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Role of a storefront user.
///
/// This is a closed set: the role-to-console mapping in the web crate
/// matches exhaustively over it, so adding a role forces that mapping to
/// be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular shopper. Default role for new registrations.
    Customer,
    /// Store owner with access to the seller console.
    Seller,
    /// Platform operator with access to the admin console.
    Admin,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Customer, Self::Seller, Self::Admin];

    /// Wire representation used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Seller => "SELLER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "SELLER" => Ok(Self::Seller),
            "ADMIN" => Ok(Self::Admin),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}
