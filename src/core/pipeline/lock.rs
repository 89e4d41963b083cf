//! One writer per album root.

use crate::error::{OrganizerError, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lock file name inside an album root
pub const LOCK_FILE: &str = ".organizer.lock";

/// Exclusive claim on an album root, released on drop.
///
/// The lock file is created with create-new semantics, so a second claim
/// fails while the first is held. A lock file left by a crashed process has
/// to be removed by hand.
#[derive(Debug)]
pub struct RootLock {
    path: PathBuf,
}

impl RootLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                tracing::debug!("Acquired {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(OrganizerError::DestinationBusy {
                    path: root.to_path_buf(),
                    lock: path,
                })
            }
            Err(source) => Err(OrganizerError::Io { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RootLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_claim_is_busy_until_release() {
        let temp = TempDir::new().unwrap();

        let lock = RootLock::acquire(temp.path()).unwrap();
        assert!(lock.path().exists());
        assert!(matches!(
            RootLock::acquire(temp.path()),
            Err(OrganizerError::DestinationBusy { .. })
        ));

        drop(lock);
        assert!(!temp.path().join(LOCK_FILE).exists());
        assert!(RootLock::acquire(temp.path()).is_ok());
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let result = RootLock::acquire(&temp.path().join("absent"));
        assert!(matches!(result, Err(OrganizerError::Io { .. })));
    }
}
