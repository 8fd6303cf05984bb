//! Backend API error types.

use thiserror::Error;

/// Errors that can occur when talking to the backend REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP exchange itself failed (connect, timeout, body decode).
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with `success: false` and a user-facing message.
    ///
    /// This is a routine outcome (wrong password, duplicate email, expired
    /// verification token), not an infrastructure failure.
    #[error("{0}")]
    Rejected(String),

    /// The backend answered with something we could not interpret: a non-2xx
    /// status without an envelope, or an envelope with no data where data
    /// was required.
    #[error("unexpected backend response: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Whether this error carries a backend-authored, user-facing message.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Message suitable for showing to the user.
    ///
    /// Backend rejections pass through verbatim; everything else collapses
    /// to a generic message so transport details never reach the page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Transport(_) | Self::Protocol(_) => {
                "Something went wrong. Please try again.".to_owned()
            }
        }
    }
}
