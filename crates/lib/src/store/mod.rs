//! Credential store: locked, copy-on-write persistence of the trust document.
//!
//! The store is the single serialization point for all durable mutation.
//! [`CredentialStore::mutate`] holds an exclusive lock across the whole
//! read-modify-write-persist cycle, commits through an atomic temp-file
//! rename, and publishes the new state only after the commit succeeds, so
//! readers observe either the old or the fully committed document and never a
//! partial write. An error raised inside the transform releases the lock
//! without touching disk or the published state.
//!
//! The discipline for callers: do not compute password hashes (or anything
//! else slow that does not depend on locked state) inside the transform.
//! Fetch the salt with [`CredentialStore::read`], hash, then enter `mutate`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

mod errors;
mod types;

pub use errors::StoreError;
pub use types::{TrustDocument, UserRecord, is_reserved_section};

use crate::Result;

/// Exclusive-access handle over the persisted trust document.
///
/// One store instance owns one backing file; the process is expected to hold
/// a single instance per file.
pub struct CredentialStore {
    /// Backing file for the serialized document.
    path: PathBuf,
    /// Last committed state, shared with readers.
    state: RwLock<TrustDocument>,
    /// Serializes writers across the full read-modify-write-persist cycle.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    /// Open the store at `path`, bootstrapping an empty document if the file
    /// does not exist yet. Nothing is written until the first mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            TrustDocument::default()
        };
        Ok(Self {
            path,
            state: RwLock::new(document),
            write_lock: Mutex::new(()),
        })
    }

    /// Snapshot of the last committed document.
    pub fn read(&self) -> TrustDocument {
        self.state.read().unwrap().clone()
    }

    /// The server salt, fetched through a short read.
    ///
    /// Callers hash against this before entering [`CredentialStore::mutate`]
    /// so the write lock is never held across the hash primitive.
    pub fn server_salt(&self) -> Result<String> {
        self.state
            .read()
            .unwrap()
            .server_salt()
            .map(str::to_string)
            .ok_or_else(|| StoreError::ServerSaltMissing.into())
    }

    /// Apply `transform` to a copy of the document under the exclusive write
    /// lock and commit atomically.
    ///
    /// On any error from `transform` the lock is released and neither the
    /// published state nor the backing file changes.
    pub fn mutate<F>(&self, transform: F) -> Result<()>
    where
        F: FnOnce(&mut TrustDocument) -> Result<()>,
    {
        let _guard = self.write_lock.lock().unwrap();

        let mut draft = self.state.read().unwrap().clone();
        transform(&mut draft)?;
        self.persist(&draft)?;

        *self.state.write().unwrap() = draft;
        tracing::debug!(path = %self.path.display(), "trust document committed");
        Ok(())
    }

    /// Write the document to a sibling temp file and rename it into place.
    fn persist(&self, document: &TrustDocument) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, document)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
