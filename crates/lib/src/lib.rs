//!
//! Credo: a path-scoped authentication and access-control engine.
//!
//! The engine decides who a caller is (tickets), whether their credentials are
//! acceptable (salted hashing plus a brute-force cooldown), and what they may
//! touch (ordered allow/deny rules over filesystem-like paths). All durable
//! state lives in a single trust document persisted through a locked,
//! copy-on-write store.
//!
//! ## Core Concepts
//!
//! * **Trust document (`store::TrustDocument`)**: The single persisted aggregate
//!   holding the server salt, users, and access rules.
//! * **Credential store (`store::CredentialStore`)**: Exclusive-access handle
//!   over the trust document; every mutation is a locked read-modify-write
//!   with an atomic commit.
//! * **Tickets (`ticket`)**: Ephemeral per-session identity records. A session
//!   without an authenticated ticket observes a synthesized guest ticket.
//! * **Authentication (`auth::AuthEngine`)**: Login/logout, persistent-token
//!   login, and the brute-force cooldown guard.
//! * **Access resolution (`access::AccessResolver`)**: Sorted, last-match-wins
//!   evaluation of role-and-path-scoped allow/deny rules.
//! * **User administration (`admin::UserAdmin`)**: Create/edit/delete users,
//!   settings, roles, and access-rule management on top of the store.
//!
//! Collaborators the host supplies (hashing primitive, clock, path
//! normalization, hook execution, workspace provisioning) are injected as
//! traits; see [`host`] and [`clock`].

pub mod access;
pub mod admin;
pub mod auth;
pub mod clock;
pub mod crypto;
pub mod host;
pub mod policy;
pub mod store;
pub mod ticket;

pub use access::{AccessDecision, AccessResolver};
pub use admin::UserAdmin;
pub use auth::AuthEngine;
pub use clock::{Clock, SystemClock};
pub use policy::CorePolicy;
pub use store::{CredentialStore, TrustDocument};
pub use ticket::{SessionId, Ticket, TicketManager};

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the Credo library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Credo library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured access-resolution errors from the access module
    #[error(transparent)]
    Access(access::AccessError),

    /// Structured administration errors from the admin module
    #[error(transparent)]
    Admin(admin::AdminError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Auth(_) => "auth",
            Error::Access(_) => "access",
            Error::Admin(_) => "admin",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Admin(admin_err) => admin_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is an active brute-force cooldown.
    pub fn is_cooldown(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_cooldown(),
            _ => false,
        }
    }

    /// Check if this error is the undifferentiated credential rejection.
    pub fn is_credentials_rejected(&self) -> bool {
        matches!(self, Error::Auth(auth::AuthError::CredentialsNotAccepted))
    }

    /// Check if this error is a caller-side policy violation.
    pub fn is_policy_violation(&self) -> bool {
        match self {
            Error::Admin(admin_err) => admin_err.is_policy_violation(),
            Error::Access(access_err) => access_err.is_policy_violation(),
            _ => false,
        }
    }

    /// Check if this error is a write-once field violation.
    pub fn is_write_once_violation(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_write_once_violation(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}
