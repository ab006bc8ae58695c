//! JSON-file ledger store.
//!
//! The whole ledger lives in one pretty-printed JSON document. Saves go
//! through a `NamedTempFile` in the same directory: write, fsync, then
//! rename into place, so readers never observe a half-written document and a
//! failed save leaves the previous one untouched.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use hvl_types::Ledger;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::lock::WriterLock;
use crate::traits::LedgerStore;

/// Default file name of the ledger document.
pub const DEFAULT_LEDGER_FILE: &str = "blockchain.json";

/// Ledger stored as a single JSON document on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the document at `path`. Nothing is touched on disk
    /// until the first save or lock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the ledger document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sibling lock file (`<document>.lock`).
    pub fn lock_path(&self) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| DEFAULT_LEDGER_FILE.into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_FILE)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> StoreResult<Ledger> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger document yet, starting empty");
                return Ok(Ledger::new());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        // A zero-length file (e.g. `touch blockchain.json`) is an empty ledger.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ledger::new());
        }

        let ledger: Ledger = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %self.path.display(), batches = ledger.len(), "ledger loaded");
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> StoreResult<()> {
        let mut bytes = serde_json::to_vec_pretty(ledger)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        bytes.push(b'\n');

        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        // The temp file is created owner-only; keep whatever mode the
        // document already had.
        match std::fs::metadata(&self.path) {
            Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Io(e)),
        }
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            batches = ledger.len(),
            bytes = bytes.len(),
            "ledger saved"
        );
        Ok(())
    }

    fn lock_exclusive(&self) -> StoreResult<WriterLock> {
        WriterLock::acquire(&self.lock_path())
    }
}
