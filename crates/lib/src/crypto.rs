//! Credential hashing
//!
//! Passwords are never stored or compared in plaintext; what the trust
//! document holds is `digest(server_salt + plaintext)` over an injected
//! cryptographic hash primitive. The default primitive is SHA-256.

use std::sync::Arc;

use rand::Rng;
use sha2::{Digest as _, Sha256};
use zeroize::Zeroizing;

/// Fixed placeholder written over any plaintext password field the moment the
/// plaintext has been consumed, so error paths cannot echo the secret back.
pub const PASSWORD_PLACEHOLDER: &str = "xxx";

/// Length of a generated server salt, in characters.
pub const SALT_LENGTH: usize = 32;

/// Cryptographic hash primitive collaborator.
///
/// Implementations must be pure: the same bytes always produce the same
/// digest string.
pub trait DigestFn: Send + Sync {
    /// Digest arbitrary bytes into a stable string encoding.
    fn digest(&self, data: &[u8]) -> String;
}

/// SHA-256 primitive, hex-encoded. The production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestFn for Sha256Digest {
    fn digest(&self, data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }
}

/// Salts and hashes plaintext credentials with the store's server salt.
#[derive(Clone)]
pub struct PasswordHasher {
    digest: Arc<dyn DigestFn>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Arc::new(Sha256Digest))
    }
}

impl PasswordHasher {
    /// Create a hasher over the given primitive.
    pub fn new(digest: Arc<dyn DigestFn>) -> Self {
        Self { digest }
    }

    /// Compute the stored credential form: `digest(server_salt + plaintext)`.
    ///
    /// The concatenation buffer is zeroized on drop; the plaintext itself is
    /// owned by the caller and scrubbed at the operation boundary.
    pub fn hash(&self, server_salt: &str, plaintext: &str) -> String {
        let mut salted = Zeroizing::new(Vec::with_capacity(
            server_salt.len() + plaintext.len(),
        ));
        salted.extend_from_slice(server_salt.as_bytes());
        salted.extend_from_slice(plaintext.as_bytes());
        self.digest.digest(&salted)
    }
}

/// Generate a random alphanumeric server salt.
///
/// The salt is written exactly once into the trust document at system setup.
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}
