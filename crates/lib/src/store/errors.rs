//! Error types for the credential store.

use thiserror::Error;

use crate::Error;

/// Errors raised by the trust document and its persistence layer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server salt may be set exactly once, at system initialization.
    #[error("Tried to change server salt after initial creation")]
    ServerSaltAlreadySet,

    /// The GnuPG keypair fingerprint may be set exactly once.
    #[error("Tried to change GnuPG keypair after initial creation")]
    GnupgKeypairAlreadySet,

    /// An operation needed the server salt before it was initialized.
    #[error("Server salt has not been initialized")]
    ServerSaltMissing,
}

impl StoreError {
    /// Check if this error is a write-once field violation.
    pub fn is_write_once_violation(&self) -> bool {
        matches!(
            self,
            StoreError::ServerSaltAlreadySet | StoreError::GnupgKeypairAlreadySet
        )
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}
