//! Credential boundary: opaque get/save/delete storage for distributor
//! credentials.
//!
//! The pipeline treats this as an already-secure external collaborator and
//! never persists secrets itself. Two implementations ship: an in-memory
//! store for tests and short-lived runs, and a file store mirroring the
//! deployment store's one-JSON-per-record layout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CredentialResult;
use crate::models::{Credentials, DistributorId};

/// Directory where credentials are stored (relative to current dir).
const DEFAULT_CREDENTIALS_DIR: &str = ".songcast/credentials";

/// Opaque credential storage contract.
pub trait CredentialStore: Send + Sync {
    /// Stored credentials for a distributor, `None` when absent.
    fn get(&self, distributor_id: DistributorId) -> CredentialResult<Option<Credentials>>;

    /// Save (overwrite) credentials for a distributor.
    fn save(&self, distributor_id: DistributorId, credentials: &Credentials)
        -> CredentialResult<()>;

    /// Remove stored credentials for a distributor.
    fn delete(&self, distributor_id: DistributorId) -> CredentialResult<()>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Credential store living only for the process lifetime.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<DistributorId, Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, distributor_id: DistributorId) -> CredentialResult<Option<Credentials>> {
        let entries = self.entries.lock().expect("credential mutex poisoned");
        Ok(entries.get(&distributor_id).cloned())
    }

    fn save(
        &self,
        distributor_id: DistributorId,
        credentials: &Credentials,
    ) -> CredentialResult<()> {
        let mut entries = self.entries.lock().expect("credential mutex poisoned");
        entries.insert(distributor_id, credentials.clone());
        Ok(())
    }

    fn delete(&self, distributor_id: DistributorId) -> CredentialResult<()> {
        let mut entries = self.entries.lock().expect("credential mutex poisoned");
        entries.remove(&distributor_id);
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// Credential store keeping one JSON file per distributor.
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_CREDENTIALS_DIR)
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: PathBuf::from(dir.as_ref()),
        }
    }

    fn path_for(&self, distributor_id: DistributorId) -> PathBuf {
        self.dir.join(format!("{}.json", distributor_id))
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, distributor_id: DistributorId) -> CredentialResult<Option<Credentials>> {
        let path = self.path_for(distributor_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(
        &self,
        distributor_id: DistributorId,
        credentials: &Credentials,
    ) -> CredentialResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(credentials)?;
        std::fs::write(self.path_for(distributor_id), content)?;
        Ok(())
    }

    fn delete(&self, distributor_id: DistributorId) -> CredentialResult<()> {
        let path = self.path_for(distributor_id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
