//! Copies or moves a single item into its allocated destination.

use super::allocator::ensure_dir;
use super::types::OperationMode;
use crate::error::ItemError;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Transfers files into the archive
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementExecutor {
    operation: OperationMode,
}

impl PlacementExecutor {
    pub fn new(operation: OperationMode) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> OperationMode {
        self.operation
    }

    /// Copy or move `source` to `destination`, returning the byte count.
    ///
    /// `destination` must be a freshly allocated path. On failure nothing is
    /// left at `destination` and the source is untouched.
    pub fn transfer(&self, source: &Path, destination: &Path) -> Result<u64, ItemError> {
        let metadata = fs::metadata(source).map_err(|_| ItemError::NotFound {
            path: source.to_path_buf(),
        })?;
        let modified = metadata.modified().ok();

        if let Some(parent) = destination.parent() {
            ensure_dir(parent).map_err(|e| copy_failure(source, destination, e))?;
        }

        let result = match self.operation {
            OperationMode::Copy => copy_verified(source, destination, metadata.len()),
            OperationMode::Move => fs::rename(source, destination).or_else(|_| {
                // rename fails across filesystems, fall back to copy+delete
                copy_verified(source, destination, metadata.len())?;
                fs::remove_file(source)
            }),
        };

        match result {
            Ok(()) => {
                if let Some(modified) = modified {
                    preserve_mtime(destination, modified);
                }
                Ok(metadata.len())
            }
            Err(e) => {
                if self.operation == OperationMode::Copy || source.exists() {
                    let _ = fs::remove_file(destination);
                }
                Err(copy_failure(source, destination, e))
            }
        }
    }
}

/// Copy and check the destination size matches the source
fn copy_verified(source: &Path, destination: &Path, expected: u64) -> io::Result<()> {
    fs::copy(source, destination)?;

    let written = fs::metadata(destination)?.len();
    if written != expected {
        let _ = fs::remove_file(destination);
        return Err(io::Error::other(format!(
            "Copy verification failed: source {} bytes, dest {} bytes",
            expected, written
        )));
    }
    Ok(())
}

fn preserve_mtime(destination: &Path, modified: SystemTime) {
    let result = fs::File::options()
        .write(true)
        .open(destination)
        .and_then(|file| file.set_modified(modified));
    if let Err(e) = result {
        tracing::debug!("Could not preserve mtime on {}: {}", destination.display(), e);
    }
}

fn copy_failure(source: &Path, destination: &Path, source_error: io::Error) -> ItemError {
    ItemError::CopyFailure {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: source_error,
    }
}
