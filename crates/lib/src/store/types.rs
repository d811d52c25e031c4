//! The persisted trust document and its records.
//!
//! On disk the document is a JSON tree with the top-level fields
//! `server-salt`, `gnupg-keypair`, `users`, and `access`. Users are
//! key-ordered; rule order on disk carries no meaning (the resolver computes
//! its own order per query).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::StoreError;
use crate::access::AccessRule;

/// Section names a user can never read or write through the settings pathway.
pub const RESERVED_SECTIONS: [&str; 2] = ["password", "role"];

/// Check whether a settings section name is reserved for credential fields.
pub fn is_reserved_section(name: &str) -> bool {
    RESERVED_SECTIONS.contains(&name)
}

/// Root aggregate of all persisted trust state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustDocument {
    /// Write-once secret mixed into every password hash.
    #[serde(
        rename = "server-salt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    server_salt: Option<String>,

    /// Write-once GnuPG keypair fingerprint.
    #[serde(
        rename = "gnupg-keypair",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    gnupg_keypair: Option<String>,

    /// All user records, keyed by case-sensitive username.
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,

    /// Access rules. Uniqueness of `(role, id)` is enforced at mutation time.
    #[serde(default)]
    pub access: Vec<AccessRule>,
}

impl TrustDocument {
    /// The server salt, if the system has been initialized.
    pub fn server_salt(&self) -> Option<&str> {
        self.server_salt.as_deref()
    }

    /// Set the server salt. Fails if a salt was ever set before, regardless
    /// of caller.
    pub fn set_server_salt(&mut self, salt: impl Into<String>) -> Result<(), StoreError> {
        if self.server_salt.is_some() {
            return Err(StoreError::ServerSaltAlreadySet);
        }
        self.server_salt = Some(salt.into());
        Ok(())
    }

    /// The GnuPG keypair fingerprint, if one was recorded.
    pub fn gnupg_keypair(&self) -> Option<&str> {
        self.gnupg_keypair.as_deref()
    }

    /// Record the GnuPG keypair fingerprint. Write-once, like the salt.
    pub fn set_gnupg_keypair(&mut self, fingerprint: impl Into<String>) -> Result<(), StoreError> {
        if self.gnupg_keypair.is_some() {
            return Err(StoreError::GnupgKeypairAlreadySet);
        }
        self.gnupg_keypair = Some(fingerprint.into());
        Ok(())
    }
}

/// A single stored user.
///
/// The free-form settings sections are flattened next to `password` and
/// `role` on disk; the reserved names are kept out of `settings` by every
/// mutation path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Salted password hash. The guest account carries none.
    #[serde(rename = "password", default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Role the user belongs to.
    pub role: String,

    /// Free-form settings sections owned by the user.
    #[serde(flatten)]
    pub settings: BTreeMap<String, Value>,
}

impl UserRecord {
    /// A record with credentials and no settings.
    pub fn new(password_hash: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            password_hash: Some(password_hash.into()),
            role: role.into(),
            settings: BTreeMap::new(),
        }
    }
}
