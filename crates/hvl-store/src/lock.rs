//! Exclusive writer lock for a ledger document.
//!
//! File-backed stores take an advisory `flock` (via `fs2`) on a sibling
//! `<ledger>.lock` file. The lock belongs to the open file handle, so two
//! handles conflict even inside one process, and separate processes
//! pointing at the same ledger are serialized too.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::StoreResult;

/// Guard for the exclusive writer lock. Released on drop.
#[derive(Debug)]
pub struct WriterLock {
    held: Option<HeldFile>,
}

#[derive(Debug)]
struct HeldFile {
    file: File,
    path: PathBuf,
}

impl WriterLock {
    /// A guard that holds nothing, for backends whose own state is already
    /// serialized in-process.
    pub fn unlocked() -> Self {
        Self { held: None }
    }

    /// Open (creating if needed) `path` and block until an exclusive lock on
    /// it is granted.
    pub fn acquire(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        debug!(path = %path.display(), "writer lock acquired");
        Ok(Self {
            held: Some(HeldFile {
                file,
                path: path.to_path_buf(),
            }),
        })
    }

    /// Path of the lock file, if this guard holds one.
    pub fn path(&self) -> Option<&Path> {
        self.held.as_ref().map(|h| h.path.as_path())
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        // The lock file itself stays: removing it would let a waiter lock a
        // stale inode while a newcomer locks a fresh one.
        if let Some(held) = self.held.take() {
            let _ = FileExt::unlock(&held.file);
            debug!(path = %held.path.display(), "writer lock released");
        }
    }
}
