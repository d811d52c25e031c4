//! Error types for authentication.
//!
//! The taxonomy is deliberately small: a cooldown rejection is transient and
//! safe to describe, while every credential failure collapses into one
//! undifferentiated error so the caller cannot tell a bad username from a bad
//! password.

use thiserror::Error;

use crate::Error;

/// Errors raised during login.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// A prior attempt for this username is still inside the cooldown window.
    #[error("You need to wait {seconds_remaining} seconds before you can try again")]
    Cooldown {
        /// Seconds until the next attempt is allowed
        seconds_remaining: i64,
    },

    /// Unknown username or wrong password; intentionally indistinguishable.
    #[error("Credentials not accepted")]
    CredentialsNotAccepted,
}

impl AuthError {
    /// Check if this error is an active brute-force cooldown.
    pub fn is_cooldown(&self) -> bool {
        matches!(self, AuthError::Cooldown { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
