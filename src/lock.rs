//! File-based locking to prevent concurrent writes to one output directory.
//!
//! Uses flock-style advisory locking so two generator runs targeting the
//! same directory cannot interleave their artifact writes. The lock file
//! lives in the system temp directory, never among the published artifacts.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const LOCK_FILE_PREFIX: &str = "routeros-blacklist";

/// A guard that holds an exclusive lock for an output directory.
/// The lock is released and its file removed when the guard is dropped.
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Attempt to acquire the exclusive lock for `dir`.
    ///
    /// `dir` does not need to exist and is never created here.
    /// Returns an error if another run already holds the lock.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = lock_path(dir)?;

        // create+read+write without truncate avoids a race between create and lock
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {:?}", path))?;

        file.try_lock_exclusive().map_err(|_| {
            anyhow::anyhow!(
                "Another run is already writing to {:?}.\n\
                 If you believe this is an error, remove the lock file: {:?}",
                dir,
                path
            )
        })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock file for `dir`: one per absolute output directory
pub fn lock_path(dir: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(dir)
        .with_context(|| format!("Failed to resolve output directory {:?}", dir))?;

    let mut hasher = DefaultHasher::new();
    absolute.hash(&mut hasher);

    Ok(std::env::temp_dir().join(format!(
        "{}-{:016x}.lock",
        LOCK_FILE_PREFIX,
        hasher.finish()
    )))
}
