//! # Error Module
//!
//! Error types for the media organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Two tiers** - run-level errors abort before any file is touched,
//!   item-level errors are recovered inside the pipeline and only counted
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned across the pipeline boundary.
///
/// Only pre-run validation produces these; once a run has started every
/// failure is downgraded to an [`ItemError`] or a logged [`StoreError`].
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Side file error: {0}")]
    Store(#[from] StoreError),

    #[error(
        "Another run is writing to {path}. If no run is active, delete {lock} and try again."
    )]
    DestinationBusy { path: PathBuf, lock: PathBuf },

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading or producing a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {path} is not valid JSON of the form {{\"images\": [...], \"videos\": [...]}}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write manifest {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Source directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
}

/// Errors in the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Destination directory does not exist: {path}")]
    DestinationNotFound { path: PathBuf },

    #[error("No album name given. Pass one explicitly or enable batch mode with a default album.")]
    MissingAlbum,

    #[error("Album name {name:?} must be a single, non-empty folder name")]
    InvalidAlbumName { name: String },

    #[error("Date range start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Output area names must be non-empty and distinct, got {names:?}")]
    InvalidAreaNames { names: Vec<String> },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-item failures. These never abort a run.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Source file disappeared: {path}")]
    NotFound { path: PathBuf },

    #[error("Could not read image {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Failed to hash {path}: {source}")]
    HashFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors reading or writing the JSON side files
/// (recovery log, album metadata, scan history)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is corrupted ({source}). Move it aside and try again.")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_error_includes_path() {
        let error = ItemError::NotFound {
            path: PathBuf::from("/photos/IMG_0001.jpg"),
        };
        assert!(error.to_string().contains("/photos/IMG_0001.jpg"));
    }

    #[test]
    fn copy_failure_names_both_ends() {
        let error = ItemError::CopyFailure {
            from: PathBuf::from("/src/a.jpg"),
            to: PathBuf::from("/dest/2024/08/a.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = error.to_string();
        assert!(message.contains("/src/a.jpg"));
        assert!(message.contains("/dest/2024/08/a.jpg"));
    }

    #[test]
    fn busy_destination_suggests_recovery() {
        let error = OrganizerError::DestinationBusy {
            path: PathBuf::from("/archive/Family"),
            lock: PathBuf::from("/archive/Family/.organizer.lock"),
        };
        assert!(error.to_string().contains("delete /archive/Family/.organizer.lock"));
    }

    #[test]
    fn config_error_converts_into_top_level() {
        let error: OrganizerError = ConfigError::MissingAlbum.into();
        assert!(matches!(error, OrganizerError::Config(ConfigError::MissingAlbum)));
    }
}
