// src/recipe/shared.rs

//! Shared builds keyed by configuration fingerprint
//!
//! A shared build installs into `<shared-root>/<fingerprint>`. Concurrent
//! installs of the same fingerprint serialize on an advisory lock next to
//! the prefix; the first one to finish leaves a completion marker and every
//! later one finds the marker and reuses the prefix without building.
//!
//! # Lock Strategy
//!
//! - **Build lock**: `<shared-root>/<fingerprint>.lock`, held for the whole
//!   install, `flock(LOCK_EX)` via `fs2`
//! - **Marker**: `<prefix>/.cmmi-complete`, written last, under the lock

use super::fingerprint::Fingerprint;
use crate::error::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Name of the completion marker inside a shared prefix
pub const COMPLETE_MARKER: &str = ".cmmi-complete";

/// Version of the marker format
const MARKER_VERSION: u32 = 1;

/// Exclusive lock on one shared build
///
/// Released when dropped.
pub struct SharedBuildLock {
    /// Kept open to hold the lock
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl SharedBuildLock {
    /// Lock file for a fingerprint
    pub fn lock_path(shared_root: &Path, fingerprint: &Fingerprint) -> PathBuf {
        shared_root.join(format!("{}.lock", fingerprint))
    }

    /// Acquire the lock, blocking while another install holds it
    pub fn acquire(shared_root: &Path, fingerprint: &Fingerprint) -> Result<Self> {
        let path = Self::lock_path(shared_root, fingerprint);
        fs::create_dir_all(shared_root)?;

        let file = File::create(&path)?;
        file.lock_exclusive().map_err(|e| {
            Error::LockError(format!(
                "Failed to lock shared build {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!("Acquired shared build lock at {}", path.display());
        Ok(Self { file, path })
    }

    /// Try to acquire the lock without blocking
    ///
    /// `Ok(None)` means another install holds it.
    pub fn try_acquire(shared_root: &Path, fingerprint: &Fingerprint) -> Result<Option<Self>> {
        let path = Self::lock_path(shared_root, fingerprint);
        fs::create_dir_all(shared_root)?;

        let file = File::create(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired shared build lock at {}", path.display());
                Ok(Some(Self { file, path }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                debug!("Shared build lock already held at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(Error::LockError(format!(
                "Failed to try-lock shared build {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SharedBuildLock {
    fn drop(&mut self) {
        debug!("Released shared build lock at {}", self.path.display());
    }
}

/// Contents of the completion marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMarker {
    pub version: u32,
    pub fingerprint: Fingerprint,
    pub url: String,
    /// Seconds since the epoch
    pub completed_at: u64,
}

impl CompletionMarker {
    pub fn new(fingerprint: Fingerprint, url: impl Into<String>) -> Self {
        let completed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            version: MARKER_VERSION,
            fingerprint,
            url: url.into(),
            completed_at,
        }
    }

    /// Read the marker of a prefix, if the prefix holds a completed build
    ///
    /// An unreadable or foreign marker counts as no marker.
    pub fn read(prefix: &Path) -> Result<Option<Self>> {
        let path = prefix.join(COMPLETE_MARKER);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str::<Self>(&content) {
            Ok(marker) if marker.version == MARKER_VERSION => Ok(Some(marker)),
            Ok(marker) => {
                info!(
                    "Ignoring completion marker version {} in {}",
                    marker.version,
                    prefix.display()
                );
                Ok(None)
            }
            Err(e) => {
                info!("Ignoring unreadable completion marker in {}: {}", prefix.display(), e);
                Ok(None)
            }
        }
    }

    /// Write the marker into a prefix
    pub fn write(&self, prefix: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            Error::IoError(format!("Failed to serialize completion marker: {}", e))
        })?;
        fs::write(prefix.join(COMPLETE_MARKER), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn fingerprint() -> Fingerprint {
        Fingerprint::from_parts("u", "", "", "patch", "-p0", &BTreeMap::new())
    }

    #[test]
    fn test_marker_roundtrip_and_absence() {
        let temp_dir = TempDir::new().unwrap();
        assert!(CompletionMarker::read(temp_dir.path()).unwrap().is_none());

        let marker = CompletionMarker::new(fingerprint(), "http://x/z.tar.gz");
        marker.write(temp_dir.path()).unwrap();
        assert_eq!(CompletionMarker::read(temp_dir.path()).unwrap(), Some(marker));
    }

    #[test]
    fn test_garbage_marker_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(COMPLETE_MARKER), "not json").unwrap();
        assert!(CompletionMarker::read(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_lock_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let fp = fingerprint();

        let held = SharedBuildLock::acquire(temp_dir.path(), &fp).unwrap();
        assert!(held.path().ends_with(format!("{}.lock", fp)));
        assert!(SharedBuildLock::try_acquire(temp_dir.path(), &fp)
            .unwrap()
            .is_none());

        drop(held);
        assert!(SharedBuildLock::try_acquire(temp_dir.path(), &fp)
            .unwrap()
            .is_some());
    }
}
